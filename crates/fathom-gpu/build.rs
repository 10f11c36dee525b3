//! Validates the WGSL compute shader at build time so a malformed shader
//! fails `cargo build` instead of surfacing as a runtime pipeline-creation
//! error.

const STEP_SHADER: &str = include_str!("src/shaders/step.wgsl");

fn main() {
    println!("cargo:rerun-if-changed=src/shaders/step.wgsl");

    if let Err(e) = validate_shader(STEP_SHADER, "step.wgsl") {
        panic!("{e}");
    }
}

fn validate_shader(source: &str, name: &str) -> Result<(), String> {
    let module = naga::front::wgsl::parse_str(source)
        .map_err(|e| format!("WGSL parse error in {name}: {e:?}"))?;

    let mut validator = naga::valid::Validator::new(
        naga::valid::ValidationFlags::all(),
        naga::valid::Capabilities::all(),
    );

    validator
        .validate(&module)
        .map_err(|e| format!("WGSL validation error in {name}: {e:?}"))?;

    Ok(())
}
