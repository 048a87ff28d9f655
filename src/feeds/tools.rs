#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolRecord {
    pub name: String,
    pub version: String,
    pub release_date: String,
    pub url: String,
}

const CATALOG: &[(&str, &str, &str, &str)] = &[
    ("Metasploit", "6.3.0", "2024-01-15", "https://www.metasploit.com/"),
    ("Nmap", "7.94", "2023-12-20", "https://nmap.org/"),
    ("Burp Suite", "2023.12.1", "2023-12-05", "https://portswigger.net/burp"),
];

pub fn catalog() -> Vec<ToolRecord> {
    CATALOG
        .iter()
        .map(|(name, version, release_date, url)| ToolRecord {
            name: name.to_string(),
            version: version.to_string(),
            release_date: release_date.to_string(),
            url: url.to_string(),
        })
        .collect()
}
