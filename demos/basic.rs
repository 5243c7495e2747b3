use treewalk::*;

fn main() -> Result<(), WalkError> {
    // 1. Build (or receive from a parser) the input tree
    let mut b = ParseTreeBuilder::new("userAgent", "Mozilla/5.0 (Windows NT 10.0; Win64) Chrome/53.0.2785.143");
    let mozilla = b.child(0, "agent", "Mozilla/5.0 (Windows NT 10.0; Win64)");
    b.child(mozilla, "name", "Mozilla");
    let comments = b.child(mozilla, "comments", "(Windows NT 10.0; Win64)");
    b.child(comments, "entry", "Windows NT 10.0");
    let chrome = b.child(0, "agent", "Chrome/53.0.2785.143");
    b.child(chrome, "name", "Chrome");
    b.child(chrome, "version", "53.0.2785.143");
    let tree = b.build();

    // 2. Register lookup tables
    let lookups = LookupRegistryBuilder::new()
        .table("windows_nt", [("windows nt 10.0", "Windows 10")])
        .build();

    // 3. Describe the patterns
    let os = Matcher::lookup_with_default(
        "windows_nt",
        "Unknown",
        PathBuilder::new()
            .down(ChildRange::single(1)?, "agent")
            .down(ChildRange::single(1)?, "comments")
            .down(ChildRange::single(1)?, "entry")
            .back_to_full()
            .matcher(),
    );
    let version = Matcher::clean_version(
        PathBuilder::new()
            .down("(1-2)".parse()?, "agent")
            .down(ChildRange::single(1)?, "name")
            .equals("Chrome")
            .up()
            .down(ChildRange::single(1)?, "version")
            .back_to_full()
            .matcher(),
    );

    // 4. Compile; no static index here, so every step is kept
    let options = CompileOptions::new().static_index(false);
    let os_list = compile(&os, &lookups, &options)?;
    let version_list = compile(&version, &lookups, &options)?;
    println!("OS walk list:{}", os_list);
    println!("Version walk list:{}", version_list);

    // 5. Walk
    println!("OS: {:?}", os_list.walk(tree.root(), ""));
    println!("Version: {:?}", version_list.walk(tree.root(), ""));
    Ok(())
}
