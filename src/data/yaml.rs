//! YAML processing utilities

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use yaml_rust_davvid::{Yaml, YamlEmitter};

/// Serializes `data` to YAML with literal block style for multi-line strings.
///
/// The leading `---` document marker is omitted since these buffers are
/// meant for people, not for streams.
pub fn to_yaml<T: Serialize>(data: &T) -> Result<String> {
    let serde_value = serde_yaml::to_value(data).context("Failed to serialize to serde value")?;
    let yaml_value = convert_serde_to_yaml_rust(&serde_value);

    let mut output = String::new();
    let mut emitter = YamlEmitter::new(&mut output);
    emitter.multiline_strings(true);
    emitter.dump(&yaml_value).context("Failed to emit YAML")?;

    let body = output
        .strip_prefix("---\n")
        .or_else(|| output.strip_prefix("---"))
        .unwrap_or(&output);
    let mut body = body.to_string();
    if !body.ends_with('\n') {
        body.push('\n');
    }
    Ok(body)
}

/// Like [`to_yaml`], preceded by `header` rendered as `#` comment lines.
pub fn to_yaml_with_header<T: Serialize>(header: &str, data: &T) -> Result<String> {
    let mut buffer = String::new();
    for line in header.lines() {
        if line.is_empty() {
            buffer.push_str("#\n");
        } else {
            buffer.push_str("# ");
            buffer.push_str(line);
            buffer.push('\n');
        }
    }
    buffer.push_str(&to_yaml(data)?);
    Ok(buffer)
}

fn convert_serde_to_yaml_rust(value: &serde_yaml::Value) -> Yaml {
    match value {
        serde_yaml::Value::Null => Yaml::Null,
        serde_yaml::Value::Bool(b) => Yaml::Boolean(*b),
        serde_yaml::Value::Number(n) => n.as_i64().map_or_else(
            || {
                n.as_f64()
                    .map_or_else(|| Yaml::String(n.to_string()), |f| Yaml::Real(f.to_string()))
            },
            Yaml::Integer,
        ),
        serde_yaml::Value::String(s) => Yaml::String(s.clone()),
        serde_yaml::Value::Sequence(seq) => {
            Yaml::Array(seq.iter().map(convert_serde_to_yaml_rust).collect())
        }
        serde_yaml::Value::Mapping(map) => {
            let mut yaml_map = yaml_rust_davvid::yaml::Hash::new();
            for (k, v) in map {
                yaml_map.insert(convert_serde_to_yaml_rust(k), convert_serde_to_yaml_rust(v));
            }
            Yaml::Hash(yaml_map)
        }
        serde_yaml::Value::Tagged(tagged) => convert_serde_to_yaml_rust(&tagged.value),
    }
}

/// Deserialize YAML string to data structure
pub fn from_yaml<T: for<'de> Deserialize<'de>>(yaml: &str) -> Result<T> {
    serde_yaml::from_str(yaml).context("Failed to deserialize YAML")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[derive(Serialize, Deserialize, Debug, PartialEq)]
    struct Pair {
        title: String,
        description: String,
    }

    #[test]
    fn multiline_description_survives() {
        let pair = Pair {
            title: "Add login: form".to_string(),
            description: "Adds a form.\n\n- validates input\n- stores session".to_string(),
        };
        let yaml = to_yaml(&pair).unwrap();
        assert!(!yaml.starts_with("---"));
        assert!(yaml.contains("title:"));
        assert_eq!(from_yaml::<Pair>(&yaml).unwrap(), pair);
    }

    #[test]
    fn header_lines_become_comments() {
        let pair = Pair {
            title: "T".to_string(),
            description: "D".to_string(),
        };
        let buffer = to_yaml_with_header("Edit below\n\nSave to apply", &pair).unwrap();
        assert!(buffer.starts_with("# Edit below\n#\n# Save to apply\n"));
        assert_eq!(from_yaml::<Pair>(&buffer).unwrap(), pair);
    }

    #[test]
    fn from_yaml_reports_bad_input() {
        assert!(from_yaml::<Pair>("title: [unclosed").is_err());
    }
}
