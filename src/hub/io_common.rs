use std::collections::HashMap;
use std::path::Path;

pub fn simplify_file_name(path: &str) -> String {
    Path::new(path)
        .file_name()
        .and_then(|s| s.to_str())
        .unwrap_or(path)
        .to_string()
}

/// Makes the column names of a header row unique.
///
/// A repeated name gets a numeric suffix: `rate`, `rate_1`, `rate_2`.
/// Blank names stay blank: those columns are not read.
pub fn unique_headers(raw: &[String]) -> Vec<String> {
    let mut seen: HashMap<String, usize> = HashMap::new();
    let mut res: Vec<String> = Vec::with_capacity(raw.len());
    for name in raw.iter() {
        let name = name.trim().to_string();
        if name.is_empty() {
            res.push(name);
            continue;
        }
        let mut candidate = name.clone();
        while let Some(n) = seen.get_mut(&candidate) {
            *n += 1;
            candidate = format!("{}_{}", name, n);
        }
        seen.insert(candidate.clone(), 0);
        res.push(candidate);
    }
    res
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(xs: &[&str]) -> Vec<String> {
        xs.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn repeated_headers_get_suffixes() {
        assert_eq!(
            unique_headers(&names(&["channel", "rate", "rate", " rate ", "", "rate_1"])),
            names(&["channel", "rate", "rate_1", "rate_2", "", "rate_1_1"])
        );
    }

    #[test]
    fn file_name_only() {
        assert_eq!(simplify_file_name("/data/q3/retention.xlsx"), "retention.xlsx");
        assert_eq!(simplify_file_name("retention.csv"), "retention.csv");
    }
}
