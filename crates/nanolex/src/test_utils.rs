use crate::{Chunks, Context, Grammar, Outcome, Token, Tokenizer};

pub fn lit(text: &str) -> Token {
    Token::literal(text)
}

pub fn context(tokens: &[Token], text: &str) -> Context<'static> {
    let tokenizer = Tokenizer::new(tokens).expect("test tokens compile");
    Context::new(tokenizer.tokenize(text))
}

/// Run `grammar` once from the start of `text`, returning the outcome and the final cursor.
pub fn run<T: 'static>(tokens: &[Token], grammar: &Grammar<T>, text: &str) -> (Outcome<T>, usize) {
    let mut ctx = context(tokens, text);
    let outcome = grammar.parse(&mut ctx);
    (outcome, ctx.cursor())
}

pub fn texts(chunks: &Chunks) -> Vec<&str> {
    chunks.iter().collect()
}
