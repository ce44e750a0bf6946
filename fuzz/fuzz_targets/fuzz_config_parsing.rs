//! Fuzz target for `~/.badm` parsing.
//!
//! This fuzzer feeds arbitrary documents to the configuration parser to ensure:
//! 1. No input causes a panic
//! 2. Malformed JSON is rejected with an error
//! 3. Any document that parses resolves bucket types and survives a write/read cycle
//!
//! Run with: `cargo +nightly fuzz run fuzz_config_parsing`

#![no_main]

use arbitrary::Arbitrary;
use badm::config::Configuration;
use libfuzzer_sys::fuzz_target;

#[derive(Arbitrary, Debug)]
struct ConfigInput {
    /// Raw document text
    json: String,
    /// Bucket to resolve after parsing
    bucket: String,
    /// Optional structured shape to splice the input into
    shape: Option<Shape>,
}

#[derive(Arbitrary, Debug)]
enum Shape {
    /// Input as the selected path
    SelectedPath,
    /// Input as a bucket key type
    KeyType,
    /// Input under the legacy `plugins` key
    LegacyPlugins,
    /// Null collections
    NullCollections,
}

impl ConfigInput {
    fn build(&self) -> String {
        let Some(shape) = &self.shape else {
            return self.json.clone();
        };
        let quoted = serde_json::Value::String(self.json.clone()).to_string();
        match shape {
            Shape::SelectedPath => format!(r#"{{"selected_path":{quoted}}}"#),
            Shape::KeyType => format!(r#"{{"buckets":{{"b":{{"key_type":{quoted}}}}}}}"#),
            Shape::LegacyPlugins => format!(r#"{{"plugins":[{{"path":{quoted}}}]}}"#),
            Shape::NullCollections => r#"{"buckets":null,"extensions":null}"#.to_string(),
        }
    }
}

fuzz_target!(|input: ConfigInput| {
    let text = input.build();

    let Ok(config) = serde_json::from_str::<Configuration>(&text) else {
        return;
    };

    // Resolution never fails and never yields an empty name.
    assert!(!config.key_type(&input.bucket).is_empty());
    assert!(!config.value_type(&input.bucket).is_empty());

    let written = serde_json::to_string(&config).expect("serialize parsed configuration");
    let reread: Configuration =
        serde_json::from_str(&written).expect("reparse written configuration");
    for bucket in config.buckets.keys() {
        assert_eq!(config.key_type(bucket), reread.key_type(bucket));
        assert_eq!(config.value_type(bucket), reread.value_type(bucket));
    }
    assert_eq!(config.extensions, reread.extensions);
});
