use std::collections::BTreeMap;
use std::path::Path;

/// Region name to representative countries, used to expand continent-level
/// preferences ("somewhere in Asia") into country filters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegionTable {
    regions: BTreeMap<String, Vec<String>>,
}

const DEFAULT_REGIONS: &[(&str, &[&str])] = &[
    (
        "asia",
        &[
            "japan", "thailand", "bali", "indonesia", "vietnam", "india", "maldives",
            "singapore", "south korea", "philippines",
        ],
    ),
    (
        "europe",
        &[
            "italy", "france", "spain", "germany", "greece", "portugal", "switzerland",
            "austria", "netherlands", "belgium", "england", "uk", "ireland", "scotland",
            "wales", "poland",
        ],
    ),
    (
        "africa",
        &["egypt", "south africa", "morocco", "kenya", "tanzania"],
    ),
    (
        "south america",
        &["brazil", "argentina", "peru", "chile", "colombia"],
    ),
    (
        "north america",
        &["united states", "canada", "mexico"],
    ),
    (
        "oceania",
        &["australia", "new zealand", "fiji"],
    ),
    (
        "middle east",
        &["united arab emirates", "jordan", "oman", "qatar"],
    ),
    (
        "scandinavia",
        &["norway", "sweden", "denmark", "finland", "iceland"],
    ),
];

impl Default for RegionTable {
    fn default() -> Self {
        Self::from_pairs(DEFAULT_REGIONS.iter().map(|(region, countries)| {
            (
                region.to_string(),
                countries.iter().map(|c| c.to_string()).collect(),
            )
        }))
    }
}

impl RegionTable {
    pub fn from_pairs(pairs: impl IntoIterator<Item = (String, Vec<String>)>) -> Self {
        Self {
            regions: pairs
                .into_iter()
                .map(|(region, countries)| {
                    (
                        region.trim().to_lowercase(),
                        countries.into_iter().map(|c| c.trim().to_lowercase()).collect(),
                    )
                })
                .collect(),
        }
    }

    /// Load a table from a JSON object of `region -> [countries]`
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let raw: BTreeMap<String, Vec<String>> = serde_json::from_str(json)?;
        Ok(Self::from_pairs(raw))
    }

    pub async fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let json = tokio::fs::read_to_string(path.as_ref()).await?;
        Ok(Self::from_json(&json)?)
    }

    pub fn countries(&self, region: &str) -> Option<&[String]> {
        self.regions
            .get(&region.trim().to_lowercase())
            .map(Vec::as_slice)
    }

    /// Replace region names with their countries. Order is kept and duplicates dropped.
    pub fn expand(&self, entries: &[String]) -> Vec<String> {
        let mut out: Vec<String> = Vec::new();
        let mut push = |name: &str| {
            let name = name.trim().to_lowercase();
            if !name.is_empty() && !out.contains(&name) {
                out.push(name);
            }
        };

        for entry in entries {
            match self.countries(entry) {
                Some(countries) => countries.iter().for_each(|c| push(c.as_str())),
                None => push(entry.as_str()),
            }
        }
        out
    }

    /// Prompt lines describing each region's expansion
    pub fn prompt_lines(&self) -> String {
        self.regions
            .iter()
            .map(|(region, countries)| {
                format!("   - If they say \"{region}\" include: {}", countries.join(", "))
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expands_regions_and_keeps_countries() {
        let table = RegionTable::default();
        let expanded = table.expand(&["Japan".into(), "Asia".into(), "Peru".into()]);
        assert_eq!(expanded[0], "japan");
        assert_eq!(expanded.last().map(String::as_str), Some("peru"));
        assert_eq!(expanded.iter().filter(|c| *c == "japan").count(), 1);
        assert!(expanded.contains(&"philippines".to_string()));
        assert_eq!(expanded.len(), 11);
    }

    #[test]
    fn loads_custom_table_from_json() {
        let table = RegionTable::from_json(r#"{"Balkans": ["Croatia", "Albania"]}"#).unwrap();
        assert_eq!(
            table.countries("balkans"),
            Some(&["croatia".to_string(), "albania".to_string()][..])
        );
        assert_eq!(table.countries("asia"), None);
    }
}
