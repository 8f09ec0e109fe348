//! `setup.bash` export lines
//!
//! The file is shell code sourced at login. Only lines assigning one of the
//! tracked keys are touched; everything else is carried through verbatim.
//! `ROS_SUPER_CLIENT` may be written in a terminal-only conditional form so
//! that background services never run as super clients.

use super::atomic::write_atomic;
use super::{read_required, unquote};
use crate::defaults;
use crate::error::Result;
use crate::models::ExportKey;
use regex::Regex;
use std::collections::BTreeMap;
use std::path::Path;

/// Values found in (or destined for) the export file; `None` means empty
pub type ExportMapping = BTreeMap<ExportKey, Option<String>>;

/// How one key's assignment line is recognized, parsed and rendered
pub trait ExportLineStyle {
    /// Regex source matching the start of an assignment up to and including `=`
    fn assignment_pattern(&self, key: &str) -> String {
        format!(r"^\s*export\s+{}=", regex::escape(key))
    }

    /// Extract the assigned value from the text following `=`
    fn extract<'a>(&self, rest: &'a str) -> &'a str {
        unquote(rest)
    }

    /// Render a full line without its line terminator
    fn render(&self, key: &str, value: Option<&str>) -> String {
        format!("export {}=\"{}\"", key, value.unwrap_or_default())
    }
}

/// `export KEY="VALUE"`
pub struct PlainExport;

impl ExportLineStyle for PlainExport {}

/// `[ -t 0 ] && export KEY=True || export KEY=False` when true, plain otherwise
pub struct TerminalOnlyExport;

impl ExportLineStyle for TerminalOnlyExport {
    fn assignment_pattern(&self, key: &str) -> String {
        format!(
            r"^\s*(?:\[\s*-t\s+0\s*\]\s*&&\s*)?export\s+{}=",
            regex::escape(key)
        )
    }

    fn extract<'a>(&self, rest: &'a str) -> &'a str {
        let first = rest.split("||").next().unwrap_or(rest);
        unquote(first)
    }

    fn render(&self, key: &str, value: Option<&str>) -> String {
        match value {
            Some(v) if v == defaults::TRUE_LITERAL => format!(
                "[ -t 0 ] && export {key}={} || export {key}={}",
                defaults::TRUE_LITERAL,
                defaults::FALSE_LITERAL,
            ),
            _ => PlainExport.render(key, value),
        }
    }
}

/// Serialization strategy for a key
pub fn style_for(key: ExportKey) -> &'static dyn ExportLineStyle {
    match key {
        ExportKey::SuperClient => &TerminalOnlyExport,
        _ => &PlainExport,
    }
}

struct LineMatcher {
    key: ExportKey,
    style: &'static dyn ExportLineStyle,
    regex: Regex,
}

fn matchers() -> Result<Vec<LineMatcher>> {
    ExportKey::ALL
        .iter()
        .map(|key| {
            let style = style_for(*key);
            Ok(LineMatcher {
                key: *key,
                style,
                regex: Regex::new(&style.assignment_pattern(key.as_str()))?,
            })
        })
        .collect()
}

/// Collect the tracked keys assigned in `text`; the last assignment wins
pub fn parse(text: &str) -> Result<ExportMapping> {
    let matchers = matchers()?;
    let mut mapping = ExportMapping::new();

    for line in text.lines() {
        for matcher in &matchers {
            if let Some(found) = matcher.regex.find(line) {
                let value = matcher.style.extract(&line[found.end()..]);
                let value = if value.is_empty() { None } else { Some(value.to_string()) };
                mapping.insert(matcher.key, value);
                break;
            }
        }
    }

    Ok(mapping)
}

/// Patch `existing` with fresh lines for every key in `entries`
///
/// Matching lines are replaced in place keeping their line terminator; keys
/// without a line are inserted at the top in the order given.
pub fn render(existing: &str, entries: &[(ExportKey, Option<String>)]) -> Result<String> {
    let matchers = matchers()?;
    let wanted: BTreeMap<ExportKey, Option<&str>> = entries
        .iter()
        .map(|(key, value)| (*key, value.as_deref()))
        .collect();

    let mut seen = Vec::new();
    let mut body = String::with_capacity(existing.len() + 64);

    for line in existing.split_inclusive('\n') {
        let content = line.trim_end_matches(['\n', '\r']);
        let terminator = &line[content.len()..];

        let tracked = matchers
            .iter()
            .find(|m| wanted.contains_key(&m.key) && m.regex.is_match(content));

        match tracked {
            Some(matcher) => {
                let value = wanted.get(&matcher.key).copied().flatten();
                body.push_str(&matcher.style.render(matcher.key.as_str(), value));
                body.push_str(terminator);
                seen.push(matcher.key);
            }
            None => body.push_str(line),
        }
    }

    let mut header = String::new();
    for (key, value) in entries {
        if !seen.contains(key) {
            header.push_str(&style_for(*key).render(key.as_str(), value.as_deref()));
            header.push('\n');
        }
    }

    Ok(header + &body)
}

/// Read the tracked keys from the export file
pub fn read(path: &Path) -> Result<ExportMapping> {
    parse(&read_required(path)?)
}

/// Rewrite the export file with `entries`, creating it if absent
pub fn write(path: &Path, entries: &[(ExportKey, Option<String>)]) -> Result<()> {
    let existing = super::read_optional(path)?.unwrap_or_default();
    write_atomic(path, &render(&existing, entries)?)
}

/// Mirror the exported values into this process's environment
///
/// Absent values are exported as empty strings, like the shell does after
/// sourcing `export KEY=""`.
pub fn apply_to_process_env(entries: &[(ExportKey, Option<String>)]) {
    for (key, value) in entries {
        std::env::set_var(key.as_str(), value.as_deref().unwrap_or_default());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn entries(pairs: &[(ExportKey, Option<&str>)]) -> Vec<(ExportKey, Option<String>)> {
        pairs
            .iter()
            .map(|(key, value)| (*key, value.map(str::to_string)))
            .collect()
    }

    #[test]
    fn test_parse_plain_and_quoted() {
        let text = "\
# ROS setup
export ROS_DOMAIN_ID=\"12\"
export ROBOT_NAMESPACE='/robot1'
  export RMW_IMPLEMENTATION=rmw_fastrtps_cpp
export ROS_DISCOVERY_SERVER=\"\"
";
        let mapping = parse(text).unwrap();
        assert_eq!(mapping[&ExportKey::DomainId].as_deref(), Some("12"));
        assert_eq!(mapping[&ExportKey::Namespace].as_deref(), Some("/robot1"));
        assert_eq!(mapping[&ExportKey::Rmw].as_deref(), Some("rmw_fastrtps_cpp"));
        assert_eq!(mapping[&ExportKey::DiscoveryServer], None);
        assert!(!mapping.contains_key(&ExportKey::Workspace));
    }

    #[test]
    fn test_parse_terminal_only_form() {
        let text = "[ -t 0 ] && export ROS_SUPER_CLIENT=True || export ROS_SUPER_CLIENT=False\n";
        let mapping = parse(text).unwrap();
        assert_eq!(mapping[&ExportKey::SuperClient].as_deref(), Some("True"));
    }

    #[test]
    fn test_parse_keeps_semicolons_in_discovery_string() {
        let text = "export ROS_DISCOVERY_SERVER=\"127.0.0.1:11811;;10.0.0.5:11811;\"\n";
        let mapping = parse(text).unwrap();
        assert_eq!(
            mapping[&ExportKey::DiscoveryServer].as_deref(),
            Some("127.0.0.1:11811;;10.0.0.5:11811;")
        );
    }

    #[test]
    fn test_parse_ignores_prefix_collisions() {
        let text = "export ROS_DOMAIN_ID_OLD=\"5\"\nexport FOO=bar\n";
        assert!(parse(text).unwrap().is_empty());
    }

    #[test]
    fn test_render_replaces_in_place_and_preserves_unrelated_lines() {
        let existing = "\
# keep me
export FOO=bar
export ROS_DOMAIN_ID=\"0\"
source /opt/ros/jazzy/setup.bash
";
        let rendered = render(existing, &entries(&[(ExportKey::DomainId, Some("42"))])).unwrap();
        assert_eq!(
            rendered,
            "\
# keep me
export FOO=bar
export ROS_DOMAIN_ID=\"42\"
source /opt/ros/jazzy/setup.bash
"
        );
    }

    #[test]
    fn test_render_inserts_missing_keys_at_top() {
        let existing = "# comment\n";
        let rendered = render(
            existing,
            &entries(&[(ExportKey::Namespace, None), (ExportKey::DomainId, Some("3"))]),
        )
        .unwrap();
        assert_eq!(
            rendered,
            "export ROBOT_NAMESPACE=\"\"\nexport ROS_DOMAIN_ID=\"3\"\n# comment\n"
        );
    }

    #[test]
    fn test_render_super_client_forms() {
        let on = render("", &entries(&[(ExportKey::SuperClient, Some("True"))])).unwrap();
        assert_eq!(
            on,
            "[ -t 0 ] && export ROS_SUPER_CLIENT=True || export ROS_SUPER_CLIENT=False\n"
        );

        // The conditional line is recognized and swapped back to the plain form
        let off = render(&on, &entries(&[(ExportKey::SuperClient, Some("False"))])).unwrap();
        assert_eq!(off, "export ROS_SUPER_CLIENT=\"False\"\n");
    }

    #[test]
    fn test_render_is_idempotent() {
        let existing = "# header\nexport FOO=bar\nexport ROS_DOMAIN_ID=\"7\"";
        let values = entries(&[
            (ExportKey::DomainId, Some("7")),
            (ExportKey::SuperClient, Some("True")),
            (ExportKey::DiscoveryServer, Some("127.0.0.1:11811;")),
        ]);
        let first = render(existing, &values).unwrap();
        let second = render(&first, &values).unwrap();
        assert_eq!(first, second);
        assert!(first.ends_with("export ROS_DOMAIN_ID=\"7\""));
    }

    #[test]
    fn test_write_then_read() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("setup.bash");
        std::fs::write(&path, "export FOO=bar\n").unwrap();

        let values = entries(&[
            (ExportKey::Rmw, Some("rmw_cyclonedds_cpp")),
            (ExportKey::Namespace, None),
        ]);
        write(&path, &values).unwrap();

        let mapping = read(&path).unwrap();
        assert_eq!(mapping[&ExportKey::Rmw].as_deref(), Some("rmw_cyclonedds_cpp"));
        assert_eq!(mapping[&ExportKey::Namespace], None);
        assert!(std::fs::read_to_string(&path).unwrap().ends_with("export FOO=bar\n"));
    }

    #[test]
    fn test_apply_to_process_env() {
        apply_to_process_env(&entries(&[
            (ExportKey::Workspace, Some("/opt/ros/jazzy/setup.bash")),
            (ExportKey::Namespace, None),
        ]));
        assert_eq!(std::env::var("WORKSPACE_SETUP").unwrap(), "/opt/ros/jazzy/setup.bash");
        assert_eq!(std::env::var("ROBOT_NAMESPACE").unwrap(), "");
    }
}
