//! Sample script program.
//!
//! Records how it was called in the session and exits with the number of
//! arguments. `--fail` makes the script return an error and `--panic` makes
//! it panic, so the host's failure handling can be exercised end to end.

use dotscript::prelude::*;

#[dotscript::script_main]
fn demo_script(args: &[String], state: &mut SessionState) -> Result<i32, String> {
    if let Some(label) = state.get("DEMO_LABEL") {
        state.set("LABEL", label);
    }
    state.set("ARG_COUNT", args.len().to_string());

    if args.iter().any(|a| a == "--fail") {
        return Err("requested failure".to_string());
    }
    if args.iter().any(|a| a == "--panic") {
        panic!("requested panic");
    }

    Ok(args.len() as i32)
}
