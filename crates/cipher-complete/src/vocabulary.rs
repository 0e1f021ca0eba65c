use std::fs;
use std::path::Path;

use crate::Result;

/// Built-in vocabulary used when no word list is supplied.
pub const DEFAULT_VOCABULARY: &[&str] = &[
    "apple", "application", "banana", "bat", "ball", "cat", "car", "camera", "dog", "doll",
    "dinosaur", "elephant", "eagle", "egg", "fish", "frog", "giraffe", "goat", "hat",
    "house", "ice", "igloo", "jacket", "juice", "kangaroo", "key", "lamp", "lion", "monkey",
    "moon", "notebook", "needle", "octopus", "owl", "pencil", "panda", "queen", "quilt",
    "rabbit", "robot", "snake", "sun", "tiger", "table", "umbrella", "unicorn", "vase",
    "van", "whale", "watch", "xylophone", "xenon", "yacht", "yak", "zebra", "zero", "grape",
    "green", "blue", "yellow", "orange", "black", "white", "purple", "red", "chair",
    "computer", "phone", "tablet", "book", "glass", "bottle", "fan", "clock", "television",
    "radio", "speaker", "monitor", "laptop", "printer", "keyboard", "mouse", "piano",
    "guitar", "drum", "violin", "carrot", "broccoli", "potato", "tomato", "corn", "lettuce",
    "peach", "pear", "plum", "watermelon", "strawberry", "blueberry", "raspberry",
];

/// Load a word list file (one key per line).
///
/// Surrounding whitespace is trimmed; blank lines and `#` comments are
/// skipped. Case is preserved.
pub fn load_word_list(path: &Path) -> Result<Vec<String>> {
    let content = fs::read_to_string(path)?;
    Ok(parse_word_list(&content))
}

fn parse_word_list(content: &str) -> Vec<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty() && !l.starts_with('#'))
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;

    #[test]
    fn default_vocabulary_is_distinct() {
        let mut words: Vec<&str> = DEFAULT_VOCABULARY.to_vec();
        words.sort_unstable();
        words.dedup();
        assert_eq!(words.len(), DEFAULT_VOCABULARY.len());
        assert_eq!(words.len(), 99);
    }

    #[test]
    fn parse_skips_comments_and_blanks() {
        let words = parse_word_list("# fruit\napple\n\n  Apex  \n#banana\napp\n");
        assert_eq!(words, vec!["apple", "Apex", "app"]);
    }

    #[test]
    fn load_missing_file_is_io_error() {
        let err = load_word_list(Path::new("/nonexistent/words.txt")).unwrap_err();
        assert!(
            matches!(&err, Error::Io(e) if e.kind() == std::io::ErrorKind::NotFound),
            "{err:?}"
        );
    }
}
