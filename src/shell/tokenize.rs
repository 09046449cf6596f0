//! Line tokenizing.
//!
//! Words are split on unquoted whitespace. Single and double quotes group
//! text (including spaces) into one word and are removed. An unquoted `;`
//! ends a command, so one line may hold several commands.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenizeError {
    #[error("unterminated {0} quote")]
    UnterminatedQuote(char),
}

/// Split `line` into commands, each a non-empty list of words.
pub fn tokenize(line: &str) -> Result<Vec<Vec<String>>, TokenizeError> {
    let mut commands = Vec::new();
    let mut words: Vec<String> = Vec::new();
    let mut word = String::new();
    // 区分 "" 空参数与没有参数
    let mut in_word = false;
    let mut chars = line.chars();

    while let Some(c) = chars.next() {
        match c {
            '\'' | '"' => {
                in_word = true;
                loop {
                    match chars.next() {
                        Some(q) if q == c => break,
                        Some(other) => word.push(other),
                        None => return Err(TokenizeError::UnterminatedQuote(c)),
                    }
                }
            }
            ';' => {
                if in_word {
                    words.push(std::mem::take(&mut word));
                    in_word = false;
                }
                if !words.is_empty() {
                    commands.push(std::mem::take(&mut words));
                }
            }
            c if c.is_whitespace() => {
                if in_word {
                    words.push(std::mem::take(&mut word));
                    in_word = false;
                }
            }
            c => {
                in_word = true;
                word.push(c);
            }
        }
    }

    if in_word {
        words.push(word);
    }
    if !words.is_empty() {
        commands.push(words);
    }
    Ok(commands)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn words(line: &str) -> Vec<Vec<String>> {
        tokenize(line).unwrap()
    }

    #[test]
    fn test_whitespace_split() {
        assert_eq!(words("  ls   -l\tdir "), vec![vec!["ls", "-l", "dir"]]);
        assert!(words("   ").is_empty());
    }

    #[test]
    fn test_quotes_group_words() {
        assert_eq!(words("cp 'my file.txt' \"other dir\""), vec![vec!["cp", "my file.txt", "other dir"]]);
        assert_eq!(words("cat a\"b c\"d"), vec![vec!["cat", "ab cd"]]);
        assert_eq!(words("find ''"), vec![vec!["find", ""]]);
        assert_eq!(words("echo \"it's\""), vec![vec!["echo", "it's"]]);
    }

    #[test]
    fn test_semicolon_separates_commands() {
        assert_eq!(
            words("mkdir a; cd a ;;pwd"),
            vec![vec!["mkdir", "a"], vec!["cd", "a"], vec!["pwd"]]
        );
        assert_eq!(words("touch 'a;b'"), vec![vec!["touch", "a;b"]]);
    }

    #[test]
    fn test_unterminated_quote() {
        assert_eq!(tokenize("cat 'oops"), Err(TokenizeError::UnterminatedQuote('\'')));
    }
}
