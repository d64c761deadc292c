use vt_solver::*;
use vt_types::*;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("VeriTune catalog building example");

    // An in-memory stand-in for a solver's introspection API
    let source = StaticOptionSource::new()
        .with_option("produce-models", OptionInfo::boolean(false))
        .with_option("seed", OptionInfo::integer(0, Some(0), None))
        .with_option("restart-factor", OptionInfo::float(1.5, Some(1.0), Some(10.0)))
        .with_option("bitblast", OptionInfo::mode(Some("lazy"), &["lazy", "eager"]))
        .with_option("exotic-opt", OptionInfo {
            type_tag: "regexp".to_string(),
            default: None,
            minimum: None,
            maximum: None,
            modes: Vec::new(),
        });

    let build = build_catalog(&source)?;
    println!(
        "Classified {} parameters ({} skipped)",
        build.catalog.len(),
        build.skipped.len()
    );

    for skipped in &build.skipped {
        println!("  skipped {}: {}", skipped.name, skipped.reason);
    }

    // Validate some candidate values
    let catalog = &build.catalog;
    println!(
        "seed=42 valid: {}",
        catalog.validate("seed", Some(&ParamValue::Int(42)))
    );
    println!(
        "bitblast=greedy valid: {}",
        catalog.validate("bitblast", Some(&ParamValue::Str("greedy".to_string())))
    );

    // Build a command line from a selection
    let selection = OptionSelection::new()
        .with_value("produce-models", true)
        .with_value("restart-factor", 2.5)
        .with_value("bitblast", "eager");

    let built = build_args(catalog, &selection);
    println!("solver args: {:?}", built.tokens);

    Ok(())
}
