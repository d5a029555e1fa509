use imp::lexer::{tokenize, Tag, Token};

fn lexemes(source: &str) -> Vec<String> {
    tokenize(source)
        .unwrap()
        .iter()
        .map(|t| t.lexeme().to_string())
        .collect()
}

#[test]
fn lex_keywords() {
    let tokens = tokenize("func return if else end while").unwrap();
    assert_eq!(tokens.len(), 6);
    assert!(matches!(tokens[0], Token::Func(_)));
    assert!(matches!(tokens[1], Token::Return(_)));
    assert!(matches!(tokens[2], Token::If(_)));
    assert!(matches!(tokens[3], Token::Else(_)));
    assert!(matches!(tokens[4], Token::End(_)));
    assert!(matches!(tokens[5], Token::While(_)));
    assert!(tokens.iter().all(|t| t.tag() == Tag::Syntax));
}

#[test]
fn lex_identifiers() {
    let tokens = tokenize("foo bar_2 X").unwrap();
    assert_eq!(tokens.len(), 3);
    assert!(matches!(&tokens[0], Token::Ident(i) if i.value == "foo"));
    assert!(matches!(&tokens[1], Token::Ident(i) if i.value == "bar_2"));
    assert!(matches!(&tokens[2], Token::Ident(i) if i.value == "X"));
}

#[test]
fn lex_keyword_prefix_is_identifier() {
    let tokens = tokenize("iffy ends whileloop").unwrap();
    assert!(tokens.iter().all(|t| t.tag() == Tag::Variable));
    assert_eq!(lexemes("iffy ends whileloop"), vec!["iffy", "ends", "whileloop"]);
}

#[test]
fn lex_booleans() {
    let tokens = tokenize("true false").unwrap();
    assert!(tokens.iter().all(|t| t.tag() == Tag::Boolean));
}

#[test]
fn lex_integers() {
    let tokens = tokenize("42 0 123").unwrap();
    assert_eq!(tokens.len(), 3);
    assert!(matches!(&tokens[0], Token::Integer(i) if i.value == "42"));
    assert!(tokens.iter().all(|t| t.tag() == Tag::Number));
}

#[test]
fn lex_longest_operator_wins() {
    assert_eq!(lexemes(">= > <= < == != :="), vec![">=", ">", "<=", "<", "==", "!=", ":="]);
    assert_eq!(lexemes("a>=b"), vec!["a", ">=", "b"]);
    assert_eq!(lexemes("!x&&y||z"), vec!["!", "x", "&&", "y", "||", "z"]);
}

#[test]
fn lex_minus_is_always_an_operator() {
    assert_eq!(lexemes("5 -3"), vec!["5", "-", "3"]);
    assert_eq!(lexemes("5-3"), vec!["5", "-", "3"]);
}

#[test]
fn lex_whitespace_is_dropped() {
    assert_eq!(lexemes("x\n\t:=  1 ;"), vec!["x", ":=", "1", ";"]);
}

#[test]
fn lex_unknown_character_fails() {
    let err = tokenize("func main() { return 1 % 2 }").unwrap_err();
    assert_eq!(err.remainder, "% 2 }");
    assert_eq!(err.tokens.len(), 7);
    assert!(!err.to_string().contains("func main"));
}
