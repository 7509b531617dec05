//! Category Taxonomy
//!
//! Static category -> keyword mapping used by the keyword classifier and
//! embedded in the inference prompt. Built once per run from the builtin
//! tables plus configured custom keywords; never mutated afterwards.

use std::collections::HashMap;

use super::types::Category;

// ============================================================================
// BUILTIN KEYWORD TABLES
// ============================================================================

const DEVELOPMENT: &[&str] = &[
    // IDEs & editors
    "code.exe", "vscode", "git", "node.exe", "python", "java", "npm",
    "visual studio", "devenv", "rider", "intellij", "pycharm", "webstorm",
    "sublime", "notepad++", "atom", "vim", "neovim", "emacs", "cursor",
    // Build tools
    "gradle", "maven", "cmake", "msbuild", "webpack", "vite", "esbuild",
    // Containers
    "docker", "podman", "containerd", "kubernetes", "kubectl", "minikube",
    // Version control
    "github", "gitlab", "gitkraken", "sourcetree", "tortoisegit",
    // Terminals
    "windowsterminal", "wt.exe", "alacritty", "hyper", "terminus",
    // Package managers
    "yarn", "pnpm", "pip", "cargo", "composer", "nuget",
    // Debug tools
    "debugger", "gdb", "lldb", "windbg",
];

const GAMING: &[&str] = &[
    // Launchers
    "steam", "epicgameslauncher", "gog", "origin", "uplay", "ubisoft",
    "battlenet", "riotclient", "ea app", "xbox", "playnite",
    // Games
    "league of legends", "valorant", "csgo", "cs2", "dota2", "fortnite",
    "minecraft", "roblox", "genshin", "apex", "overwatch", "warzone",
    "pubg", "rainbow six", "elden ring", "hogwarts", "baldur",
    // Gaming tools
    "reshade", "msi afterburner", "rtss", "rivatuner", "fraps",
    "nvidia broadcast", "geforce", "razer", "logitech", "corsair icue",
    "steelseries", "hyperx", "roccat",
];

const OFFICE: &[&str] = &[
    "winword", "excel", "powerpnt", "outlook", "teams", "onenote",
    "access.exe", "publisher", "visio", "project",
    "libreoffice", "openoffice", "wps", "notion", "evernote", "obsidian",
    "todoist", "trello", "asana", "monday", "clickup", "jira",
    "confluence", "acrobat", "foxit", "sumatra", "calibre",
];

const BROWSERS: &[&str] = &[
    "chrome.exe", "firefox.exe", "msedge.exe", "brave.exe", "opera",
    "vivaldi", "safari", "chromium", "tor browser", "arc.exe",
    "librewolf", "waterfox", "floorp", "zen browser",
];

const MEDIA: &[&str] = &[
    // Players
    "spotify", "vlc.exe", "mpc-hc", "mpv", "foobar", "musicbee",
    "winamp", "itunes", "amazon music", "tidal", "deezer",
    // Video editing
    "premiere", "afterfx", "davinci", "vegas", "filmora", "shotcut",
    "kdenlive", "avidemux", "handbrake",
    // Image editing
    "photoshop", "lightroom", "gimp", "paint.net", "krita", "inkscape",
    "affinity", "canva", "figma", "sketch",
    // Audio
    "audacity", "audition", "reaper", "ableton", "fl studio",
    "cubase", "logic", "garageband", "pro tools",
    // 3D
    "blender", "maya", "3dsmax", "cinema4d", "zbrush", "substance",
    "unreal", "unity",
];

const COMMUNICATION: &[&str] = &[
    "discord", "slack", "telegram", "whatsapp", "skype", "zoom",
    "webex", "signal", "element", "wire", "viber", "line",
    "messenger", "google meet", "facetime", "mumble", "teamspeak",
    "ventrilo", "guilded",
];

const DATABASE: &[&str] = &[
    "postgres", "mysql", "mongodb", "redis", "sqlserver", "oracle",
    "sqlite", "mariadb", "cassandra", "couchdb", "elasticsearch",
    "influxdb", "neo4j", "dbeaver", "datagrip", "heidisql",
    "pgadmin", "robo3t", "mongodb compass", "tableplus",
];

const NETWORKING: &[&str] = &[
    "nordvpn", "expressvpn", "surfshark", "protonvpn", "mullvad",
    "wireshark", "putty", "winscp", "filezilla", "cyberduck",
    "teamviewer", "anydesk", "parsec", "moonlight", "sunshine",
    "remotedesktop", "mstsc", "realvnc", "tightvnc", "rustdesk",
    "nmap", "fiddler", "postman", "insomnia", "charles", "proxyman",
    "ngrok", "tailscale", "zerotier", "netsetman",
];

const SECURITY: &[&str] = &[
    "antivirus", "defender", "msmpeng", "mpcmdrun", "mpdefender",
    "nissrv", "malware", "kaspersky", "avast", "norton", "bitdefender",
    "eset", "avg", "mcafee", "sophos", "f-secure", "trendmicro",
    "keepass", "lastpass", "1password", "bitwarden", "dashlane",
    "smartscreen", "securityhealth", "comodo", "glasswire",
    "veracrypt", "truecrypt", "cryptomator", "gpg4win",
];

const VIRTUALIZATION: &[&str] = &[
    "vmware", "virtualbox", "hyperv", "qemu", "wsl", "wslhost",
    "vagrant", "multipass", "parallels", "proxmox", "virt-manager",
    "vmcompute", "vmms", "vmmem",
];

const CLOUD_STORAGE: &[&str] = &[
    "dropbox", "onedrive", "googledrive", "icloud", "mega",
    "sync.com", "pcloud", "nextcloud", "owncloud", "box",
    "spideroak", "tresorit", "resilio", "syncthing",
];

const AI: &[&str] = &[
    // Local LLM servers & assistants
    "ollama", "lmstudio", "gpt4all", "koboldcpp", "text-generation",
    "oobabooga", "llamacpp", "localai",
    // Notebooks
    "jupyter", "jupyterlab", "colab", "kaggle",
    // ML tooling
    "tensorboard", "mlflow", "wandb",
    // Image AI
    "stable diffusion", "comfyui", "automatic1111", "invoke",
    "midjourney", "dall-e", "fooocus",
    // Voice AI
    "whisper", "tortoise", "bark", "coqui",
];

const STREAMING: &[&str] = &[
    // Streaming software
    "obs", "obs64", "streamlabs", "xsplit", "twitch studio",
    "nvidia shadowplay", "geforce experience", "radeon software",
    // Streaming services
    "netflix", "prime video", "disney", "hulu", "hbo max",
    "peacock", "paramount", "crunchyroll", "funimation", "plex",
    "jellyfin", "emby", "kodi",
    // Game streaming
    "steam link", "stadia", "xcloud", "geforce now", "playstation",
    "remote play",
];

const SYSTEM: &[&str] = &[
    "system", "svchost", "explorer.exe", "dwm.exe", "csrss",
    "winlogon", "services.exe", "lsass", "smss", "wininit",
    "taskhostw", "runtimebroker", "dllhost", "conhost", "sihost",
    "ctfmon", "fontdrvhost", "spoolsv", "searchhost", "searchindexer",
    "shellexperiencehost", "startmenuexperiencehost", "textinputhost",
    "applicationframehost", "systemsettings", "settingssynchost",
    "backgroundtaskhost", "gamingservices", "securityhealthsystray",
    "useroobe", "lockapp", "logonui", "dashost", "apphelp",
    "wudfhost", "wmiprvse", "msiexec", "trustedinstaller",
    "tiworker", "searchprotocol", "audiodg", "nvcontainer",
    "nvdisplay", "amdrsserv", "radeonsoft", "igfx",
];

fn builtin_keywords(category: Category) -> &'static [&'static str] {
    match category {
        Category::Development => DEVELOPMENT,
        Category::Gaming => GAMING,
        Category::Office => OFFICE,
        Category::Browsers => BROWSERS,
        Category::Media => MEDIA,
        Category::Communication => COMMUNICATION,
        Category::Database => DATABASE,
        Category::Networking => NETWORKING,
        Category::Security => SECURITY,
        Category::Virtualization => VIRTUALIZATION,
        Category::CloudStorage => CLOUD_STORAGE,
        Category::Ai => AI,
        Category::Streaming => STREAMING,
        Category::System => SYSTEM,
    }
}

// ============================================================================
// TAXONOMY
// ============================================================================

/// Immutable category -> keyword mapping in evaluation order.
#[derive(Debug, Clone)]
pub struct CategoryTaxonomy {
    entries: Vec<(Category, Vec<String>)>,
}

impl CategoryTaxonomy {
    /// Builtin taxonomy: every category, builtin keywords only.
    pub fn builtin() -> Self {
        Self::new(&Category::ALL, &HashMap::new())
    }

    /// Build the taxonomy for a run.
    ///
    /// Categories keep their declared evaluation order regardless of the
    /// order of `enabled`; custom keywords are lower-cased and appended
    /// after the builtin set.
    pub fn new(enabled: &[Category], custom: &HashMap<Category, Vec<String>>) -> Self {
        let entries = Category::ALL
            .iter()
            .copied()
            .filter(|c| enabled.contains(c))
            .map(|category| {
                let mut keywords: Vec<String> = builtin_keywords(category)
                    .iter()
                    .map(|k| k.to_string())
                    .collect();
                if let Some(extra) = custom.get(&category) {
                    for keyword in extra {
                        let lower = keyword.to_lowercase();
                        if !lower.is_empty() && !keywords.contains(&lower) {
                            keywords.push(lower);
                        }
                    }
                }
                (category, keywords)
            })
            .collect();

        Self { entries }
    }

    /// Categories with their keyword sets, in evaluation order.
    pub fn entries(&self) -> impl Iterator<Item = (Category, &[String])> {
        self.entries.iter().map(|(c, k)| (*c, k.as_slice()))
    }

    /// Is the category part of this run's taxonomy?
    pub fn contains(&self, category: Category) -> bool {
        self.entries.iter().any(|(c, _)| *c == category)
    }

    /// Resolve a service-reported category name against this taxonomy.
    pub fn resolve(&self, name: &str) -> Option<Category> {
        Category::parse(name).filter(|c| self.contains(*c))
    }

    /// Category names in evaluation order, for prompt embedding.
    pub fn category_names(&self) -> Vec<&'static str> {
        self.entries.iter().map(|(c, _)| c.as_str()).collect()
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_covers_all_categories_in_order() {
        let taxonomy = CategoryTaxonomy::builtin();
        let order: Vec<Category> = taxonomy.entries().map(|(c, _)| c).collect();
        assert_eq!(order, Category::ALL.to_vec());
    }

    #[test]
    fn test_custom_keywords_are_appended_lowercased() {
        let mut custom = HashMap::new();
        custom.insert(Category::Development, vec!["MyIDE".to_string()]);
        let taxonomy = CategoryTaxonomy::new(&Category::ALL, &custom);

        let (_, keywords) = taxonomy
            .entries()
            .find(|(c, _)| *c == Category::Development)
            .unwrap();
        assert!(keywords.contains(&"myide".to_string()));
        // Builtin set stays in front
        assert_eq!(keywords[0], "code.exe");
    }

    #[test]
    fn test_disabled_category_is_absent() {
        let enabled = [Category::Development, Category::System];
        let taxonomy = CategoryTaxonomy::new(&enabled, &HashMap::new());
        assert!(!taxonomy.contains(Category::Gaming));
        assert!(taxonomy.resolve("gaming").is_none());
        assert_eq!(taxonomy.resolve("development"), Some(Category::Development));
    }

    #[test]
    fn test_duplicate_custom_keyword_not_added_twice() {
        let mut custom = HashMap::new();
        custom.insert(Category::Browsers, vec!["Firefox.exe".to_string()]);
        let taxonomy = CategoryTaxonomy::new(&Category::ALL, &custom);
        let (_, keywords) = taxonomy
            .entries()
            .find(|(c, _)| *c == Category::Browsers)
            .unwrap();
        let count = keywords.iter().filter(|k| *k == "firefox.exe").count();
        assert_eq!(count, 1);
    }
}
