//! The `manifest.json` blob embedded in every TOR artifact
//! (`spec.md` §4.7: "a manifest.json blob is mandatory"). Its exact
//! shape is this toolchain's own convention, not a pinned cross-tool
//! format, but it follows the same canonical-field-order discipline as
//! the ABI/storage JSON (`spec.md` §9) for consistency.

use crate::options::TorOptions;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Manifest {
    pub package_name: String,
    pub package_version: String,
    pub interface_name: Option<String>,
    pub include_source: bool,
}

impl Manifest {
    pub fn from_options(contract_name: &str, options: &TorOptions) -> Self {
        Self {
            package_name: options.package_name.clone().unwrap_or_else(|| contract_name.to_string()),
            package_version: options.package_version.clone(),
            interface_name: options.interface_name.clone(),
            include_source: options.include_source,
        }
    }
}

fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            c => out.push(c),
        }
    }
    out
}

pub fn encode_manifest_json(m: &Manifest) -> String {
    let mut out = String::new();
    out.push('{');
    out.push_str(&format!("\"package_name\":\"{}\"", escape(&m.package_name)));
    out.push_str(&format!(",\"package_version\":\"{}\"", escape(&m.package_version)));
    match &m.interface_name {
        Some(name) => out.push_str(&format!(",\"interface_name\":\"{}\"", escape(name))),
        None => out.push_str(",\"interface_name\":null"),
    }
    out.push_str(&format!(",\"include_source\":{}", m.include_source));
    out.push('}');
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encodes_manifest_with_stable_field_order() {
        let m = Manifest { package_name: "demo".into(), package_version: "0.0.0".into(), interface_name: Some("Demo".into()), include_source: true };
        assert_eq!(
            encode_manifest_json(&m),
            r#"{"package_name":"demo","package_version":"0.0.0","interface_name":"Demo","include_source":true}"#
        );
    }

    #[test]
    fn null_interface_name_when_absent() {
        let m = Manifest { package_name: "demo".into(), package_version: "0.0.0".into(), interface_name: None, include_source: false };
        assert!(encode_manifest_json(&m).contains("\"interface_name\":null"));
    }

    #[test]
    fn from_options_defaults_package_name_to_contract_name() {
        let m = Manifest::from_options("Demo", &TorOptions::default());
        assert_eq!(m.package_name, "Demo");
        assert_eq!(m.package_version, "0.0.0");
    }
}
