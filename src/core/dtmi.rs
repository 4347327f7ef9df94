use regex::Regex;
use std::sync::OnceLock;

// Validation regex published at
// https://github.com/Azure/digital-twin-model-identifier#validation-regular-expressions
const DTMI_PATTERN: &str =
    r"^dtmi:[A-Za-z](?:[A-Za-z0-9_]*[A-Za-z0-9])?(?::[A-Za-z](?:[A-Za-z0-9_]*[A-Za-z0-9])?)*;[1-9][0-9]{0,8}$";

fn dtmi_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(DTMI_PATTERN).expect("DTMI pattern is a valid regex"))
}

/// Full-match check against the DTMI grammar.
pub fn is_valid_dtmi(dtmi: &str) -> bool {
    dtmi_regex().is_match(dtmi)
}

/// Maps a DTMI to its repository-relative document path, following the model
/// repository convention: `dtmi:com:example:Thermostat;1` becomes
/// `/dtmi/com/example/thermostat-1.json`. Invalid identifiers have no path.
pub fn dtmi_to_path(dtmi: &str) -> Option<String> {
    if !is_valid_dtmi(dtmi) {
        return None;
    }
    Some(format!(
        "/{}.json",
        dtmi.to_lowercase().replace(':', "/").replace(';', "-")
    ))
}
