//! Filename sanitization.

/// Characters Windows refuses in file and folder names.
const WINDOWS_RESERVED: &[char] = &['<', '>', ':', '"', '/', '\\', '|', '?', '*'];

/// How aggressively rendered path segments are sanitized.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NamingOptions {
    /// Apply Windows naming rules.
    pub windows: bool,
    /// Only allow printable ASCII (0x21..=0x7E), which also excludes spaces.
    pub restrict: bool,
}

impl NamingOptions {
    /// Windows rules are always on when running on Windows.
    pub fn new(windows: bool, restrict: bool) -> Self {
        Self {
            windows: windows || cfg!(windows),
            restrict,
        }
    }
}

/// Sanitize a single filename.
///
/// Rules, in order:
/// 1. `/` becomes `_`
/// 2. control characters 0x00..=0x1F are removed
/// 3. with Windows rules, `< > : " / \ | ? *` become `_`
/// 4. with restricted names, anything outside 0x21..=0x7E becomes `_`
pub fn sanitize_filename(name: &str, options: NamingOptions) -> String {
    name.chars()
        .filter(|c| !matches!(*c, '\u{00}'..='\u{1f}'))
        .map(|c| match c {
            '/' => '_',
            c if options.windows && WINDOWS_RESERVED.contains(&c) => '_',
            c if options.restrict && !matches!(c, '\u{21}'..='\u{7e}') => '_',
            c => c,
        })
        .collect()
}

/// Sanitize a folder name.
///
/// Same as [`sanitize_filename`]; with Windows rules trailing spaces and
/// periods are also dropped since Windows cannot create such folders.
pub fn sanitize_foldername(name: &str, options: NamingOptions) -> String {
    let sanitized = sanitize_filename(name, options);
    if options.windows {
        sanitized.trim_end_matches([' ', '.']).to_string()
    } else {
        sanitized
    }
}

/// Split a filename into stem and extension (without the dot).
///
/// Leading dots belong to the stem, so `.bashrc` has no extension and
/// `archive.tar.gz` splits into `archive.tar` and `gz`.
pub fn split_extension(filename: &str) -> (&str, &str) {
    let leading_dots = filename.len() - filename.trim_start_matches('.').len();
    match filename[leading_dots..].rfind('.') {
        Some(pos) => {
            let dot = leading_dots + pos;
            (&filename[..dot], &filename[dot + 1..])
        }
        None => (filename, ""),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PLAIN: NamingOptions = NamingOptions {
        windows: false,
        restrict: false,
    };
    const WINDOWS: NamingOptions = NamingOptions {
        windows: true,
        restrict: false,
    };
    const RESTRICTED: NamingOptions = NamingOptions {
        windows: false,
        restrict: true,
    };

    #[test]
    fn test_sanitize_filename_plain() {
        assert_eq!(sanitize_filename("normal.txt", PLAIN), "normal.txt");
        assert_eq!(sanitize_filename("a/b.txt", PLAIN), "a_b.txt");
        assert_eq!(sanitize_filename("tab\there\n.png", PLAIN), "tabhere.png");
        // Only `/` is special outside Windows rules.
        assert_eq!(sanitize_filename("what?.png", PLAIN), "what?.png");
    }

    #[test]
    fn test_sanitize_filename_windows() {
        assert_eq!(
            sanitize_filename(r#"a<b>c:d"e\f|g?h*.png"#, WINDOWS),
            "a_b_c_d_e_f_g_h_.png"
        );
    }

    #[test]
    fn test_sanitize_filename_restricted() {
        assert_eq!(sanitize_filename("my cat é.png", RESTRICTED), "my_cat__.png");
        assert_eq!(sanitize_filename("日本.jpg", RESTRICTED), "__.jpg");
        assert_eq!(sanitize_filename("del\u{7f}.jpg", RESTRICTED), "del_.jpg");
    }

    #[test]
    fn test_sanitize_foldername_windows_trailing() {
        assert_eq!(sanitize_foldername("folder. . ", WINDOWS), "folder");
        assert_eq!(sanitize_foldername(".hidden", WINDOWS), ".hidden");
        assert_eq!(sanitize_foldername("folder. ", PLAIN), "folder. ");
    }

    #[test]
    fn test_sanitize_is_idempotent() {
        let inputs = [
            "plain.png",
            "a/b\\c:d",
            "  spaced out . ",
            "ctl\u{1}\u{1f}chars",
            "ünïcödé <weird>?*.gif",
            "...",
        ];
        let modes = [
            PLAIN,
            WINDOWS,
            RESTRICTED,
            NamingOptions {
                windows: true,
                restrict: true,
            },
        ];

        for input in inputs {
            for mode in modes {
                let once = sanitize_filename(input, mode);
                assert_eq!(sanitize_filename(&once, mode), once, "{input:?} {mode:?}");

                let once = sanitize_foldername(input, mode);
                assert_eq!(sanitize_foldername(&once, mode), once, "{input:?} {mode:?}");
            }
        }
    }

    #[test]
    fn test_split_extension() {
        assert_eq!(split_extension("cat.png"), ("cat", "png"));
        assert_eq!(split_extension("archive.tar.gz"), ("archive.tar", "gz"));
        assert_eq!(split_extension("README"), ("README", ""));
        assert_eq!(split_extension(".bashrc"), (".bashrc", ""));
        assert_eq!(split_extension("trailing."), ("trailing", ""));
    }

    #[test]
    fn test_windows_forced_on_windows_hosts() {
        let options = NamingOptions::new(false, false);
        assert_eq!(options.windows, cfg!(windows));
        assert!(NamingOptions::new(true, false).windows);
    }
}
