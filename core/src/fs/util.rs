use std::cmp::Ordering;

/// Case-insensitive ordering that compares embedded digit runs by value, so
/// `shot2` sorts before `shot10`.
pub fn natural_cmp(a: &str, b: &str) -> Ordering {
    let a_key = a.to_lowercase();
    let b_key = b.to_lowercase();
    let a_tokens = tokenize(&a_key);
    let b_tokens = tokenize(&b_key);

    for (a_tok, b_tok) in a_tokens.iter().zip(b_tokens.iter()) {
        let order = match (a_tok, b_tok) {
            (Token::Number(a_digits, a_val), Token::Number(b_digits, b_val)) => {
                a_val.cmp(b_val).then_with(|| a_digits.len().cmp(&b_digits.len()))
            }
            (Token::Text(a_text), Token::Text(b_text)) => a_text.cmp(b_text),
            (Token::Number(..), Token::Text(..)) => Ordering::Less,
            (Token::Text(..), Token::Number(..)) => Ordering::Greater,
        };
        if order != Ordering::Equal {
            return order;
        }
    }

    a_tokens.len().cmp(&b_tokens.len()).then_with(|| a.cmp(b))
}

/// A run of text or ASCII digits within a file name.
#[derive(Debug, PartialEq)]
pub enum Token<'a> {
    Text(&'a str),
    Number(&'a str, u128),
}

impl Token<'_> {
    pub fn as_str(&self) -> &str {
        match self {
            Token::Text(text) => text,
            Token::Number(digits, _) => digits,
        }
    }
}

/// Split `input` into alternating text and digit runs. Concatenating the
/// tokens reproduces `input` exactly.
pub fn tokenize(input: &str) -> Vec<Token<'_>> {
    let mut tokens = Vec::new();
    let mut start = 0;
    let mut chars = input.char_indices().peekable();

    while let Some((idx, ch)) = chars.next() {
        if ch.is_ascii_digit() {
            if start < idx {
                tokens.push(Token::Text(&input[start..idx]));
            }
            let mut end = idx + ch.len_utf8();
            while let Some(&(nidx, nch)) = chars.peek() {
                if nch.is_ascii_digit() {
                    chars.next();
                    end = nidx + nch.len_utf8();
                } else {
                    break;
                }
            }
            let digits = &input[idx..end];
            // Runs too long for u128 keep their text but carry no value.
            let value = digits.parse::<u128>().unwrap_or(u128::MAX);
            tokens.push(Token::Number(digits, value));
            start = end;
        }
    }

    if start < input.len() {
        tokens.push(Token::Text(&input[start..]));
    }

    tokens
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokens_concatenate_back_to_input() {
        let input = "plate_v002.1001.exr";
        let joined: String = tokenize(input).iter().map(Token::as_str).collect();
        assert_eq!(joined, input);
    }
}
