use std::path::Path;

use tally_output::{
    ConfigError, ItemOverride, LayoutRegistry, OutputConfig, OutputPolicy, Which,
};

const TOML: &str = r#"
[quantities.edep]
layout = "image_with_squared"
output_path = "out/edep.mhd"
keep_data_per_run = true

[quantities.edep.items.uncertainty]
write_to_disk = true
suffix = "unc"

[quantities.let]
layout = "quotient_image"
output_path = "out/let.mhd"
auto_merge = false

[quantities.let.items.denominator]
active = false
"#;

#[test]
fn builds_outputs_from_toml() {
    let config: OutputConfig = toml::from_str(TOML).unwrap();
    let outputs = config.build(&LayoutRegistry::builtin()).unwrap();

    let names: Vec<_> = outputs.iter().map(|output| output.name()).collect();
    assert_eq!(names, ["edep", "let"]);

    let edep = &outputs[0];
    assert_eq!(edep.layout().name, "image_with_squared");
    assert_eq!(
        *edep.policy(),
        OutputPolicy {
            keep_data_per_run: true,
            ..OutputPolicy::default()
        }
    );
    assert!(edep.get_write_to_disk("uncertainty").unwrap());
    assert!(!edep.get_write_to_disk("variance").unwrap());
    assert_eq!(
        edep.get_output_path_to_item(Which::Merged, "uncertainty").unwrap(),
        Path::new("out/edep_unc.mhd")
    );

    let let_output = &outputs[1];
    assert!(!let_output.policy().auto_merge);
    assert!(!let_output.get_active("denominator").unwrap());
    assert!(let_output.get_active("numerator").unwrap());
}

#[test]
fn json_and_toml_agree() {
    let json = r#"{
        "quantities": {
            "edep": {
                "layout": "image_with_squared",
                "output_path": "out/edep.mhd",
                "keep_data_per_run": true,
                "items": { "uncertainty": { "write_to_disk": true, "suffix": "unc" } }
            },
            "let": {
                "layout": "quotient_image",
                "output_path": "out/let.mhd",
                "auto_merge": false,
                "items": { "denominator": { "active": false } }
            }
        }
    }"#;

    let from_json: OutputConfig = serde_json::from_str(json).unwrap();
    let from_toml: OutputConfig = toml::from_str(TOML).unwrap();
    assert_eq!(from_json, from_toml);

    let overrides = &from_json.quantities["let"].items["denominator"];
    assert_eq!(
        overrides,
        &ItemOverride {
            active: Some(false),
            ..ItemOverride::default()
        }
    );
}

#[test]
fn missing_fields_take_defaults() {
    let config: OutputConfig = toml::from_str(
        r#"
        [quantities.counts]
        layout = "single_array"
        "#,
    )
    .unwrap();

    let quantity = &config.quantities["counts"];
    assert_eq!(quantity.output_path, None);
    assert_eq!(quantity.policy, OutputPolicy::default());
    assert!(quantity.items.is_empty());
}

#[test]
fn unknown_names_are_rejected() {
    let registry = LayoutRegistry::builtin();

    let config: OutputConfig = toml::from_str(
        r#"
        [quantities.dose]
        layout = "dose_image"
        "#,
    )
    .unwrap();
    assert_eq!(
        config.build(&registry).unwrap_err(),
        ConfigError::UnknownLayout {
            quantity: "dose".into(),
            layout: "dose_image".into(),
        }
    );

    let config: OutputConfig = toml::from_str(
        r#"
        [quantities.counts]
        layout = "single_array"

        [quantities.counts.items.squared]
        write_to_disk = true
        "#,
    )
    .unwrap();
    assert_eq!(
        config.build(&registry).unwrap_err(),
        ConfigError::UnknownItem {
            quantity: "counts".into(),
            item: "squared".into(),
        }
    );
}
