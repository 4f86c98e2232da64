//! Fixed classification tables
//!
//! The closed category set, display names and icons, the static
//! name-to-category and subcategory tables, keyword hint tables used by the
//! classifier and the page parser, the meta-package category sources, and
//! the built-in fallback seed.

use once_cell::sync::Lazy;
use std::collections::{HashMap, HashSet};

/// The closed set of recognized category slugs. Anything outside this set
/// normalizes to "other".
pub const CATEGORY_SLUGS: &[&str] = &[
    "web",
    "wireless",
    "forensics",
    "exploitation",
    "password",
    "recon",
    "sniffing",
    "reverse",
    "social",
    "database",
    "crypto",
    "network",
    "vuln-scan",
    "other",
];

pub fn is_known_category(slug: &str) -> bool {
    CATEGORY_SLUGS.contains(&slug)
}

/// Lowercase and clamp a raw category into the closed set. Empty input maps
/// to "other".
pub fn normalize_category(raw: &str) -> String {
    let slug = raw.trim().to_lowercase();
    if is_known_category(&slug) {
        slug
    } else {
        "other".to_string()
    }
}

pub fn category_icon(slug: &str) -> &'static str {
    match slug {
        "web" | "network" => "🌐",
        "wireless" | "sniffing" => "📡",
        "forensics" => "🧪",
        "exploitation" => "💥",
        "password" | "crypto" => "🔐",
        "recon" | "vuln-scan" => "🔍",
        "reverse" => "🔧",
        "social" => "🎣",
        "database" => "🗄️",
        _ => "🧰",
    }
}

/// Human-readable category name; unknown slugs are title-cased.
pub fn category_display_name(slug: &str) -> String {
    match slug {
        "web" => "Web Applications".to_string(),
        "wireless" => "Wireless".to_string(),
        "forensics" => "Forensics".to_string(),
        "exploitation" => "Exploitation".to_string(),
        "password" => "Password Attacks".to_string(),
        "recon" => "Reconnaissance".to_string(),
        "sniffing" => "Sniffing/Spoofing".to_string(),
        "reverse" => "Reverse Engineering".to_string(),
        "social" => "Social Engineering".to_string(),
        "database" => "Database".to_string(),
        "crypto" => "Cryptography".to_string(),
        "network" => "Network Tools".to_string(),
        "vuln-scan" => "Vulnerability Scanning".to_string(),
        "other" => "Other".to_string(),
        other => {
            let mut chars = other.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => "Other".to_string(),
            }
        }
    }
}

/// Default subcategory label per category, used when nothing else resolves.
pub fn default_subcategory(slug: &str) -> &'static str {
    if slug == "other" {
        "Misc"
    } else {
        "General"
    }
}

/// Static name-to-category assignments for well-known tools.
static STATIC_CATEGORIES: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    let groups: &[(&str, &[&str])] = &[
        (
            "web",
            &[
                "burpsuite", "zaproxy", "ffuf", "dirb", "dirsearch", "feroxbuster", "nikto",
                "wpscan", "cewl", "gobuster", "wfuzz", "commix", "xsser", "skipfish", "whatweb",
                "wafw00f", "httprint", "cadaver", "davtest",
            ],
        ),
        (
            "wireless",
            &[
                "aircrack-ng", "wifite", "reaver", "kismet", "mdk4", "fern-wifi-cracker",
                "pixiewps", "wash", "airodump-ng", "airmon-ng", "aireplay-ng", "fluxion",
                "cowpatty", "asleap",
            ],
        ),
        (
            "forensics",
            &[
                "autopsy", "bulk-extractor", "sleuthkit", "volatility", "foremost", "chainsaw",
                "binwalk", "scalpel", "ddrescue", "guymager", "dc3dd", "ewf-tools", "extundelete",
                "photorec", "safecopy",
            ],
        ),
        (
            "exploitation",
            &[
                "metasploit-framework", "exploitdb", "beef-xss", "routersploit", "armitage",
                "crackmapexec", "powersploit", "veil", "shellter", "searchsploit", "empire",
            ],
        ),
        (
            "password",
            &[
                "john", "hashcat", "hydra", "medusa", "crunch", "hashid", "hash-identifier",
                "ophcrack", "rainbowcrack", "rsmangler", "patator", "thc-hydra", "ncrack",
                "chntpw", "cmospwd",
            ],
        ),
        (
            "recon",
            &[
                "nmap", "amass", "masscan", "theharvester", "dnsrecon", "enum4linux", "recon-ng",
                "sublist3r", "naabu", "dnsenum", "fierce", "dmitry", "maltego", "spiderfoot",
                "shodan", "subfinder", "assetfinder", "findomain", "hping3", "unicornscan",
                "zenmap", "autorecon",
            ],
        ),
        (
            "sniffing",
            &[
                "wireshark", "tcpdump", "ettercap", "bettercap", "dsniff", "netsniff-ng",
                "tshark", "arpspoof", "dnsspoof", "responder", "mitmproxy", "sslstrip", "ngrep",
                "driftnet",
            ],
        ),
        (
            "reverse",
            &[
                "ghidra", "radare2", "gdb", "apktool", "jadx", "dex2jar", "jd-gui",
                "edb-debugger", "rizin", "cutter", "objdump", "strings", "ltrace", "strace",
                "valgrind",
            ],
        ),
        (
            "social",
            &[
                "set", "gophish", "king-phisher", "social-engineer-toolkit", "evilginx2",
                "modlishka",
            ],
        ),
        (
            "database",
            &[
                "sqlmap", "odat", "mssqlclient", "nosqlmap", "bbqsql", "jsql-injection",
                "sqlninja", "hexorbase",
            ],
        ),
    ];
    let mut map = HashMap::new();
    for (category, names) in groups {
        for name in *names {
            // First assignment wins for tools listed under several groups.
            map.entry(*name).or_insert(*category);
        }
    }
    map
});

/// Category assigned to a tool name by the static table, if any.
pub fn static_category(name: &str) -> Option<&'static str> {
    STATIC_CATEGORIES.get(name.to_lowercase().as_str()).copied()
}

/// Per-category static name-to-subcategory assignments.
static STATIC_SUBCATEGORIES: Lazy<HashMap<(&'static str, &'static str), &'static str>> =
    Lazy::new(|| {
        let groups: &[(&str, &[(&str, &str)])] = &[
            (
                "web",
                &[
                    ("ffuf", "Fuzzing"),
                    ("wfuzz", "Fuzzing"),
                    ("dirb", "Discovery"),
                    ("dirsearch", "Discovery"),
                    ("feroxbuster", "Discovery"),
                    ("gobuster", "Discovery"),
                    ("nikto", "Scanning"),
                    ("zaproxy", "Proxy/Scan"),
                    ("burpsuite", "Proxy/Scan"),
                    ("wpscan", "CMS"),
                    ("cewl", "Wordlists"),
                    ("commix", "Injection"),
                    ("sqlmap", "SQLi"),
                    ("xsser", "XSS"),
                    ("skipfish", "Scanner"),
                    ("whatweb", "Fingerprint"),
                    ("httprint", "Fingerprint"),
                    ("wafw00f", "Firewall"),
                ],
            ),
            (
                "wireless",
                &[
                    ("aircrack-ng", "Capture/Crack"),
                    ("airodump-ng", "Capture"),
                    ("airmon-ng", "Interface"),
                    ("aireplay-ng", "Injection"),
                    ("wifite", "Automation"),
                    ("fern-wifi-cracker", "Automation"),
                    ("kismet", "Monitoring"),
                    ("reaver", "WPS"),
                    ("pixiewps", "WPS"),
                    ("wash", "WPS"),
                    ("mdk4", "DoS/Attacks"),
                    ("bettercap", "MiTM"),
                    ("fluxion", "Social"),
                ],
            ),
            (
                "forensics",
                &[
                    ("volatility", "Memory"),
                    ("autopsy", "Disk/FS"),
                    ("sleuthkit", "Disk/FS"),
                    ("foremost", "Carving"),
                    ("bulk-extractor", "Carving"),
                    ("scalpel", "Carving"),
                    ("chainsaw", "Windows"),
                    ("binwalk", "Firmware"),
                    ("ddrescue", "Recovery"),
                    ("extundelete", "Recovery"),
                    ("photorec", "Recovery"),
                    ("guymager", "Imaging"),
                    ("dc3dd", "Imaging"),
                    ("ewf-tools", "Imaging"),
                ],
            ),
            (
                "exploitation",
                &[
                    ("metasploit-framework", "Framework"),
                    ("beef-xss", "Client-Side"),
                    ("routersploit", "IoT/Router"),
                    ("exploitdb", "Database"),
                    ("searchsploit", "Database"),
                    ("armitage", "GUI"),
                    ("crackmapexec", "AD/SMB"),
                    ("powersploit", "PowerShell"),
                    ("veil", "Evasion"),
                    ("shellter", "Evasion"),
                ],
            ),
            (
                "password",
                &[
                    ("hashcat", "Offline"),
                    ("john", "Offline"),
                    ("hydra", "Online"),
                    ("medusa", "Online"),
                    ("patator", "Online"),
                    ("thc-hydra", "Online"),
                    ("ncrack", "Online"),
                    ("crunch", "Wordlists"),
                    ("cewl", "Wordlists"),
                    ("rsmangler", "Wordlists"),
                    ("hashid", "Identification"),
                    ("hash-identifier", "Identification"),
                    ("ophcrack", "Windows"),
                    ("rainbowcrack", "Tables"),
                ],
            ),
            (
                "recon",
                &[
                    ("amass", "Subdomains"),
                    ("sublist3r", "Subdomains"),
                    ("subfinder", "Subdomains"),
                    ("assetfinder", "Subdomains"),
                    ("findomain", "Subdomains"),
                    ("nmap", "Port Scan"),
                    ("masscan", "Port Scan"),
                    ("naabu", "Port Scan"),
                    ("theharvester", "OSINT"),
                    ("dmitry", "OSINT"),
                    ("maltego", "OSINT"),
                    ("spiderfoot", "OSINT"),
                    ("shodan", "OSINT"),
                    ("enum4linux", "SMB/AD"),
                    ("dnsrecon", "DNS"),
                    ("dnsenum", "DNS"),
                    ("fierce", "DNS"),
                    ("recon-ng", "Framework"),
                    ("autorecon", "Automation"),
                ],
            ),
            (
                "sniffing",
                &[
                    ("tcpdump", "Capture"),
                    ("tshark", "Capture"),
                    ("netsniff-ng", "Capture"),
                    ("wireshark", "Analysis"),
                    ("ettercap", "MiTM"),
                    ("dsniff", "MiTM"),
                    ("arpspoof", "Spoofing"),
                    ("dnsspoof", "Spoofing"),
                    ("responder", "LLMNR/NBT-NS"),
                    ("mitmproxy", "HTTP Proxy"),
                    ("sslstrip", "SSL Strip"),
                ],
            ),
            (
                "reverse",
                &[
                    ("ghidra", "Disassembler"),
                    ("radare2", "Disassembler"),
                    ("rizin", "Disassembler"),
                    ("gdb", "Debugger"),
                    ("edb-debugger", "Debugger"),
                    ("binwalk", "Firmware"),
                    ("apktool", "Android"),
                    ("jadx", "Android"),
                    ("dex2jar", "Android"),
                    ("jd-gui", "Java"),
                    ("cutter", "GUI"),
                ],
            ),
            (
                "social",
                &[
                    ("set", "Framework"),
                    ("social-engineer-toolkit", "Framework"),
                    ("gophish", "Phishing"),
                    ("king-phisher", "Phishing"),
                    ("evilginx2", "Phishing"),
                    ("modlishka", "Phishing"),
                    ("beef-xss", "Browser"),
                ],
            ),
            (
                "database",
                &[
                    ("sqlmap", "SQLi"),
                    ("jsql-injection", "SQLi"),
                    ("bbqsql", "Blind SQLi"),
                    ("odat", "Oracle"),
                    ("mssqlclient", "MSSQL"),
                    ("sqlninja", "MSSQL"),
                    ("nosqlmap", "NoSQL"),
                ],
            ),
            (
                "other",
                &[
                    ("atftp", "File Transfer"),
                    ("axel", "Download"),
                    ("azurehound", "Cloud/AD"),
                    ("bloodhound", "AD Mapping"),
                    ("bluelog", "Bluetooth"),
                    ("bluesnarfer", "Bluetooth"),
                    ("bopscrk", "Wordlists"),
                ],
            ),
        ];
        let mut map = HashMap::new();
        for (category, pairs) in groups {
            for (name, sub) in *pairs {
                map.insert((*category, *name), *sub);
            }
        }
        map
    });

/// Subcategory assigned to a tool within a category by the static table.
pub fn static_subcategory(name: &str, category: &str) -> Option<&'static str> {
    let category = category.trim().to_lowercase();
    let name = name.to_lowercase();
    STATIC_SUBCATEGORIES
        .get(&(category.as_str(), name.as_str()))
        .copied()
}

/// Canned one-line descriptions for tools whose pages carry none.
static TOOL_DESCRIPTIONS: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    HashMap::from([
        ("amass", "In-depth subdomain enumeration"),
        ("ffuf", "Fast web fuzzer"),
        ("gobuster", "Directory/file & DNS bruteforcer"),
        ("masscan", "Ultra-fast port scanner"),
        ("tcpdump", "Command-line packet analyzer"),
        ("volatility", "Memory forensics framework"),
        ("reaver", "WPS brute-force attack tool"),
        ("bettercap", "Network monitoring & attack tool"),
        ("crackmapexec", "Network enumeration & exploitation"),
        ("foremost", "File recovery forensics tool"),
        ("theharvester", "OSINT & email harvesting"),
        ("enum4linux", "Windows/Samba enumeration"),
        ("sleuthkit", "Digital investigation analysis"),
        ("medusa", "Fast parallel password cracker"),
        ("crunch", "Wordlist generator"),
        ("hashid", "Hash type identifier"),
        ("sublist3r", "Subdomain enumeration tool"),
        ("dsniff", "Network auditing & testing suite"),
        ("netsniff-ng", "High-performance network toolkit"),
        ("gdb", "GNU debugger for programs"),
        ("gophish", "Phishing campaign framework"),
        ("king-phisher", "Phishing campaign toolkit"),
        ("odat", "Oracle database attack tool"),
        ("nosqlmap", "NoSQL database exploitation"),
        ("feroxbuster", "Fast content discovery tool"),
        ("dirsearch", "Web path scanner"),
        ("kismet", "Wireless network detector"),
        ("mdk4", "WiFi testing & DoS tool"),
        ("wifite", "Automated WiFi auditing"),
        ("exploitdb", "Exploit database archive"),
        ("searchsploit", "Exploit database search tool"),
        ("bulk-extractor", "Digital forensics evidence tool"),
    ])
});

pub fn canned_description(name: &str) -> Option<&'static str> {
    TOOL_DESCRIPTIONS.get(name.to_lowercase().as_str()).copied()
}

/// Ordered keyword hints for inferring a category from free text. Scan
/// order matters: the first matching keyword wins.
pub const CATEGORY_KEYWORDS: &[(&str, &[&str])] = &[
    (
        "web",
        &["web", "http", "browser", "xss", "cms", "dirb", "gobuster", "zaproxy"],
    ),
    (
        "wireless",
        &["wifi", "wireless", "802.11", "bluetooth", "wpa", "wps", "aircrack", "rfid"],
    ),
    (
        "forensics",
        &["forensic", "memory", "disk", "carve", "artifact", "volatility", "sleuthkit"],
    ),
    (
        "exploitation",
        &["exploit", "payload", "exploitdb", "metasploit", "shellcode"],
    ),
    (
        "password",
        &["password", "hash", "brute", "crack", "wordlist", "rainbow", "hydra", "john"],
    ),
    (
        "recon",
        &["scan", "recon", "enum", "discover", "osint", "subdomain", "nmap", "amass"],
    ),
    (
        "sniffing",
        &["packet", "sniff", "capture", "mitm", "pcap", "wireshark", "ettercap"],
    ),
    (
        "reverse",
        &["reverse", "disassemble", "binary", "debug", "firmware", "ghidra", "radare"],
    ),
    (
        "social",
        &["phish", "campaign", "social engineer", "gophish", "setoolkit"],
    ),
    (
        "database",
        &["database", "oracle", "sql", "mssql", "mongodb", "nosql", "sqlmap"],
    ),
];

/// Category-scoped keyword hints for inferring a subcategory.
pub const SUBCATEGORY_KEYWORDS: &[(&str, &[(&str, &[&str])])] = &[
    (
        "web",
        &[
            ("Fuzzing", &["fuzz", "ffuf", "wfuzz"]),
            ("Discovery", &["dir", "enum", "gobuster", "dirb", "ferox"]),
            ("SQLi", &["sql", "database", "sqli", "blind"]),
            ("Proxy/Scan", &["proxy", "browser", "zaproxy", "burp"]),
        ],
    ),
    (
        "password",
        &[
            ("Offline", &["hashcat", "john", "offline"]),
            ("Online", &["hydra", "medusa", "ssh", "ftp"]),
            ("Wordlists", &["wordlist", "crunch", "cewl"]),
        ],
    ),
    (
        "recon",
        &[
            ("Subdomains", &["subdomain", "dns", "amass", "sublist3r", "findomain"]),
            ("Port Scan", &["port scan", "nmap", "masscan", "naabu"]),
            ("OSINT", &["osint", "harvest", "theharvester", "shodan"]),
        ],
    ),
    (
        "forensics",
        &[
            ("Memory", &["memory", "ram", "volatility"]),
            ("Disk/FS", &["disk", "image", "sleuthkit", "autopsy"]),
            ("Carving", &["carve", "foremost", "scalpel"]),
        ],
    ),
    (
        "wireless",
        &[
            ("Capture/Crack", &["capture", "crack", "aircrack", "airodump"]),
            ("Automation", &["automate", "wifite", "fern"]),
            ("Bluetooth", &["bluetooth", "bt", "blue"]),
        ],
    ),
    (
        "exploitation",
        &[
            ("Framework", &["framework", "metasploit", "routersploit"]),
            ("Client-Side", &["browser", "beef"]),
            ("Evasion", &["evasion", "veil", "shellter"]),
        ],
    ),
];

/// Tag-text to category mapping used by the page parser. Substring match,
/// scan order wins.
pub const PAGE_TAG_CATEGORIES: &[(&str, &str)] = &[
    ("web", "web"),
    ("crawler", "web"),
    ("http", "web"),
    ("recon", "recon"),
    ("enumeration", "recon"),
    ("wireless", "wireless"),
    ("wifi", "wireless"),
    ("forensics", "forensics"),
    ("memory", "forensics"),
    ("exploitation", "exploitation"),
    ("exploit", "exploitation"),
    ("password", "password"),
    ("cracking", "password"),
    ("bruteforce", "password"),
    ("sniffing", "sniffing"),
    ("capture", "sniffing"),
    ("reverse", "reverse"),
    ("phishing", "social"),
    ("social", "social"),
    ("database", "database"),
    ("sql", "database"),
];

/// Meta-packages whose dependency lists imply a category, with an optional
/// default subcategory.
pub const META_CATEGORY_SOURCES: &[(&str, &str, &str)] = &[
    ("kali-tools-information-gathering", "recon", ""),
    ("kali-tools-recon", "recon", ""),
    ("kali-tools-web", "web", ""),
    ("kali-tools-vulnerability", "vuln-scan", ""),
    ("kali-tools-wireless", "wireless", ""),
    ("kali-tools-802-11", "wireless", "Capture/Crack"),
    ("kali-tools-bluetooth", "wireless", "Bluetooth"),
    ("kali-tools-rfid", "wireless", "RFID"),
    ("kali-tools-sdr", "wireless", "SDR"),
    ("kali-tools-voip", "network", ""),
    ("kali-tools-hardware", "network", ""),
    ("kali-tools-passwords", "password", ""),
    ("kali-tools-crypto-stego", "crypto", ""),
    ("kali-tools-database", "database", ""),
    ("kali-tools-sniffing-spoofing", "sniffing", ""),
    ("kali-tools-forensics", "forensics", ""),
    ("kali-tools-post-exploitation", "exploitation", ""),
    ("kali-tools-exploitation", "exploitation", ""),
    ("kali-tools-reverse-engineering", "reverse", ""),
    ("kali-tools-social-engineering", "social", ""),
    ("kali-tools-reporting", "other", ""),
    ("kali-tools-fuzzing", "web", "Fuzzing"),
    ("kali-tools-passwords-rainbowcrack", "password", "Offline"),
    ("kali-tools-passwords-hydra", "password", "Online"),
    ("kali-tools-passwords-cracking", "password", ""),
];

/// Seed meta-groups for dependency-graph discovery.
pub const META_SEED_GROUPS: &[&str] = &["kali-linux-top10", "kali-linux-default"];

/// Prefixes marking a dependency as itself a meta-group to traverse.
pub const META_GROUP_PREFIXES: &[&str] = &["kali-linux-", "kali-tools-"];

/// Library/runtime-style package prefixes never recorded as tools.
pub const DENY_PREFIXES: &[&str] = &["lib", "python", "fonts-", "firmware-", "linux-headers-"];

/// Extra prefixes skipped during meta-hint discovery.
pub const HINT_DENY_PREFIXES: &[&str] =
    &["fonts-", "firmware-", "lib", "python", "gir1.2-", "doc-"];

/// Packages explicitly never recorded.
pub const HARD_BLOCKLIST: &[&str] =
    &["kali-linux-headless", "kali-system-gui", "kali-tools-top10"];

/// Name aliases applied before cross-checking the known-tools index.
pub const NAME_ALIASES: &[(&str, &str)] = &[("metasploit-framework", "metasploit")];

pub fn normalize_alias(name: &str) -> &str {
    NAME_ALIASES
        .iter()
        .find(|(from, _)| *from == name)
        .map(|(_, to)| *to)
        .unwrap_or(name)
}

/// Built-in last-resort seed used when every discovery source came up empty.
pub const SEED_ENTRIES: &[(&str, &str)] = &[
    ("autopsy", "forensics"),
    ("cutycapt", "web"),
    ("dirbuster", "web"),
    ("feroxbuster", "web"),
    ("fern-wifi-cracker", "wireless"),
    ("gophish", "social"),
    ("guymager", "forensics"),
    ("legion", "recon"),
    ("ophcrack", "password"),
    ("ophcrack-cli", "password"),
    ("sqlmap", "database"),
    ("zenmap", "recon"),
];

/// Name-set of an older seed shipped by previous releases. Snapshots that
/// match it exactly are truncated prior runs, not user catalogs.
pub const LEGACY_SEED_NAMES: &[&str] = &[
    "autopsy",
    "cutycapt",
    "dirbuster",
    "faraday",
    "fern-wifi-cracker",
    "gophish",
    "guymager",
    "legion",
    "ophcrack",
    "ophcrack-cli",
    "sqlitebrowser",
    "zenmap",
];

/// The historical fallback name-sets checked by stale-fallback detection.
pub fn fallback_name_sets() -> [HashSet<String>; 2] {
    [
        SEED_ENTRIES
            .iter()
            .map(|(name, _)| name.to_lowercase())
            .collect(),
        LEGACY_SEED_NAMES
            .iter()
            .map(|name| name.to_lowercase())
            .collect(),
    ]
}
