//! Choosing the program that opens a URL
//!
//! Rules are glob patterns from `[[open_pattern]]`, checked in the order they
//! appear in the config file. The first one that matches wins; if none does,
//! the URL goes to the link viewer from `[media.link]`.
//!
//! Besides the usual `*`, `?` and `[...]`, patterns may contain `{a,b}`
//! alternatives. They are expanded into one glob per alternative when the
//! rule is compiled.

use glob::Pattern;

use crate::config::Config;
use crate::error::{Error, Result};
use crate::launch::{LaunchMode, LaunchRequest, split_command};

/// Maximum number of `[[open_custom]]` openers
pub const MAX_CUSTOM_OPENERS: usize = 5;

/// A program that URLs can be handed to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Handler {
    /// Program name or path
    pub program: String,
    /// Fixed arguments placed before the URL
    pub args: Vec<String>,
    /// Run in Tusk's own terminal
    pub terminal: bool,
}

impl Handler {
    /// Parse a command line like `mpv --fs`
    pub fn parse(command: &str, terminal: bool) -> Result<Self> {
        let (program, args) = split_command(command)?;
        Ok(Self {
            program,
            args,
            terminal,
        })
    }

    /// Request that opens `url` with this handler
    pub fn launch(&self, url: &str) -> LaunchRequest {
        LaunchRequest::new(
            &self.program,
            &self.args,
            [url.to_string()],
            LaunchMode::from_terminal(self.terminal),
        )
    }
}

/// A glob pattern mapped to a handler
#[derive(Debug, Clone)]
pub struct RoutingRule {
    /// Rule name, for messages
    pub name: String,
    /// Compiled patterns, one per brace alternative
    pub patterns: Vec<Pattern>,
    /// Where matching URLs go
    pub handler: Handler,
}

impl RoutingRule {
    /// Compile a rule. Fails if the pattern is not a valid glob.
    pub fn new(name: &str, pattern: &str, handler: Handler) -> Result<Self> {
        let patterns = expand_braces(pattern)
            .iter()
            .map(|alternative| {
                Pattern::new(alternative).map_err(|source| Error::InvalidPattern {
                    name: name.to_string(),
                    pattern: pattern.to_string(),
                    source,
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self {
            name: name.to_string(),
            patterns,
            handler,
        })
    }

    /// Whether this rule applies to `url`
    pub fn matches(&self, url: &str) -> bool {
        self.patterns.iter().any(|p| p.matches(url))
    }
}

/// Expand `{a,b}` alternatives, nested ones included.
///
/// `a{b,c}d{e,f}` becomes `abde`, `abdf`, `acde`, `acdf`. A brace without
/// its partner is kept as a literal character.
fn expand_braces(pattern: &str) -> Vec<String> {
    let Some((open, close)) = outer_braces(pattern) else {
        return vec![pattern.to_string()];
    };
    let prefix = &pattern[..open];
    let suffix = &pattern[close + 1..];

    let mut expanded = Vec::new();
    for alternative in split_alternatives(&pattern[open + 1..close]) {
        let joined = format!("{prefix}{alternative}{suffix}");
        expanded.extend(expand_braces(&joined));
    }
    expanded
}

/// Byte offsets of the first `{` that has a matching `}`, and that `}`
fn outer_braces(pattern: &str) -> Option<(usize, usize)> {
    let bytes = pattern.as_bytes();
    for (open, _) in pattern.match_indices('{') {
        let mut depth = 0usize;
        for (i, &b) in bytes.iter().enumerate().skip(open) {
            match b {
                b'{' => depth += 1,
                b'}' => {
                    depth -= 1;
                    if depth == 0 {
                        return Some((open, i));
                    }
                }
                _ => {}
            }
        }
    }
    None
}

/// Split the inside of a brace group on commas that are not nested deeper
fn split_alternatives(inner: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    for (i, c) in inner.char_indices() {
        match c {
            '{' => depth += 1,
            '}' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => {
                parts.push(&inner[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    parts.push(&inner[start..]);
    parts
}

/// A named program the user can pick explicitly
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomOpener {
    /// Short label shown in the UI
    pub name: String,
    /// The program
    pub handler: Handler,
}

/// Pick the program for `url`: first matching rule, else `default`
pub fn route(url: &str, rules: &[RoutingRule], default: &Handler) -> LaunchRequest {
    match rules.iter().find(|rule| rule.matches(url)) {
        Some(rule) => {
            tracing::debug!("{url} matched rule {}", rule.name);
            rule.handler.launch(url)
        }
        None => default.launch(url),
    }
}

/// Compiled rules, link handler and custom openers from the config
#[derive(Debug, Clone)]
pub struct Router {
    rules: Vec<RoutingRule>,
    link: Handler,
    custom: Vec<CustomOpener>,
}

impl Router {
    /// Build the router, compiling every pattern
    pub fn from_config(config: &Config) -> Result<Self> {
        let rules = config
            .open_pattern
            .iter()
            .map(|p| RoutingRule::new(&p.name, &p.pattern, Handler::parse(&p.program, p.terminal)?))
            .collect::<Result<Vec<_>>>()?;

        if config.open_custom.len() > MAX_CUSTOM_OPENERS {
            return Err(Error::Config(format!(
                "At most {MAX_CUSTOM_OPENERS} custom openers are supported, found {}",
                config.open_custom.len()
            )));
        }
        let custom = config
            .open_custom
            .iter()
            .map(|c| {
                Ok(CustomOpener {
                    name: c.name.clone(),
                    handler: Handler::parse(&c.program, c.terminal)?,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let link = Handler::parse(&config.media.link.viewer, config.media.link.terminal)?;

        Ok(Self {
            rules,
            link,
            custom,
        })
    }

    /// Request that opens `url`
    pub fn route(&self, url: &str) -> LaunchRequest {
        route(url, &self.rules, &self.link)
    }

    /// Request that opens `url` with custom opener `index` (zero-based)
    pub fn open_custom(&self, index: usize, url: &str) -> Option<LaunchRequest> {
        self.custom.get(index).map(|c| c.handler.launch(url))
    }

    /// Configured custom openers
    pub fn custom_openers(&self) -> &[CustomOpener] {
        &self.custom
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{CustomConfig, PatternConfig};

    fn handler(program: &str, terminal: bool) -> Handler {
        Handler::parse(program, terminal).unwrap()
    }

    fn rule(name: &str, pattern: &str, program: &str) -> RoutingRule {
        RoutingRule::new(name, pattern, handler(program, false)).unwrap()
    }

    #[test]
    fn test_default_handler_when_nothing_matches() {
        let rules = vec![rule("yt", "*youtube.com/watch*", "mpv")];
        let default = handler("firefox --new-tab", false);
        let req = route("https://example.org/page", &rules, &default);
        assert_eq!(req.program, "firefox");
        assert_eq!(req.args, vec!["--new-tab", "https://example.org/page"]);
        assert_eq!(req.mode, LaunchMode::Background);
    }

    #[test]
    fn test_first_match_wins() {
        let rules = vec![
            rule("a", "*.pdf", "zathura"),
            rule("b", "*youtu*", "mpv"),
            rule("c", "*.png", "imv"),
            rule("d", "*.gif", "imv"),
            rule("e", "https://www.youtube.com/*", "vlc"),
        ];
        let default = handler("xdg-open", false);
        let url = "https://www.youtube.com/watch?v=abc";
        assert!(rules[1].matches(url));
        assert!(rules[4].matches(url));
        let req = route(url, &rules, &default);
        assert_eq!(req.program, "mpv");
        // Same input, same answer
        assert_eq!(route(url, &rules, &default), req);
    }

    #[test]
    fn test_terminal_rule_runs_in_foreground() {
        let rules = vec![RoutingRule::new("w3m", "*.txt", handler("w3m -dump", true)).unwrap()];
        let req = route("https://x.example/notes.txt", &rules, &handler("xdg-open", false));
        assert_eq!(req.mode, LaunchMode::Foreground);
        assert_eq!(req.args, vec!["-dump", "https://x.example/notes.txt"]);
    }

    #[test]
    fn test_brace_alternatives() {
        let rules = vec![rule("yt", "*{youtube.com,youtu.be}/*", "mpv")];
        let default = handler("xdg-open", false);
        assert_eq!(route("https://youtu.be/abc", &rules, &default).program, "mpv");
        assert_eq!(
            route("https://www.youtube.com/watch?v=abc", &rules, &default).program,
            "mpv"
        );
        assert_eq!(route("https://vimeo.com/1", &rules, &default).program, "xdg-open");
    }

    #[test]
    fn test_expand_braces() {
        assert_eq!(expand_braces("*.png"), vec!["*.png"]);
        assert_eq!(
            expand_braces("a{b,c}d{e,f}"),
            vec!["abde", "abdf", "acde", "acdf"]
        );
        assert_eq!(expand_braces("x{a,{b,c}}"), vec!["xa", "xb", "xc"]);
        assert_eq!(expand_braces("*.{png,}"), vec!["*.png", "*."]);
        // Unbalanced braces stay literal
        assert_eq!(expand_braces("a{b"), vec!["a{b"]);
        assert_eq!(expand_braces("a}{b,c}"), vec!["a}b", "a}c"]);
    }

    #[test]
    fn test_invalid_pattern_rejected() {
        let err = RoutingRule::new("bad", "[unclosed", handler("mpv", false)).unwrap_err();
        assert!(matches!(err, Error::InvalidPattern { .. }));
        let err = RoutingRule::new("bad", "{*.png,[x}", handler("mpv", false)).unwrap_err();
        assert!(matches!(err, Error::InvalidPattern { .. }));
    }

    #[test]
    fn test_router_from_config() {
        let mut config = Config::default();
        config.open_pattern = vec![PatternConfig {
            name: "yt".to_string(),
            pattern: "*youtu.be/*".to_string(),
            program: "mpv --ytdl".to_string(),
            terminal: false,
        }];
        config.open_custom = vec![CustomConfig {
            name: "img".to_string(),
            program: "imv".to_string(),
            terminal: false,
        }];
        let router = Router::from_config(&config).unwrap();

        let req = router.route("https://youtu.be/xyz");
        assert_eq!(req.program, "mpv");
        assert_eq!(req.args, vec!["--ytdl", "https://youtu.be/xyz"]);

        let req = router.route("https://example.org");
        assert_eq!(req.program, "xdg-open");

        let req = router.open_custom(0, "https://x.example/a.png").unwrap();
        assert_eq!(req.program, "imv");
        assert!(router.open_custom(1, "https://x.example").is_none());
    }

    #[test]
    fn test_too_many_custom_openers() {
        let mut config = Config::default();
        config.open_custom = (0..6)
            .map(|i| CustomConfig {
                name: format!("c{i}"),
                program: "true".to_string(),
                terminal: false,
            })
            .collect();
        assert!(Router::from_config(&config).is_err());
    }
}
