use std::env;

use xshell::cmd;

type DynError = Box<dyn std::error::Error>;
type Result<T> = std::result::Result<T, DynError>;

fn main() {
    if let Err(e) = try_main() {
        eprintln!("{}", e);
        std::process::exit(-1);
    }
}

fn try_main() -> Result<()> {
    let task = env::args().nth(1);
    match task.as_ref().map(|it| it.as_str()) {
        Some("ci") => ci()?,
        Some("check_fmt") => check_fmt()?,
        Some("test") => test()?,
        Some("clippy") => clippy()?,
        _ => print_help(),
    }
    Ok(())
}

fn print_help() {
    eprintln!(
        "Tasks:
ci              Runs CI locally.
check_fmt       Checks formatting.
test            Runs the tests against the simulator.
clippy          Lints library and tests.
"
    )
}

fn ci() -> Result<()> {
    check_fmt()?;
    test()?;
    clippy()?;

    eprintln!("Done!");

    Ok(())
}

fn check_fmt() -> Result<()> {
    eprintln!("Checking formatting...");
    cmd!("cargo fmt --all -- --check").run()?;
    Ok(())
}

fn test() -> Result<()> {
    eprintln!("Testing with logging...");
    cmd!("cargo test -p tossup")
        .env("RUSTFLAGS", "-D warnings")
        .run()?;

    eprintln!("Testing without logging...");
    cmd!("cargo test -p tossup --no-default-features")
        .env("RUSTFLAGS", "-D warnings")
        .run()?;

    Ok(())
}

fn clippy() -> Result<()> {
    eprintln!("Linting library and tests...");
    cmd!("cargo clippy -p tossup --all-targets -- -D warnings").run()?;

    Ok(())
}
