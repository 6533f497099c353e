use super::value::Value;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Word {
    Dup,
    Drop,
    Swap,
    Over,
    Concat,
    Compose,
    Quote,
    Len,
    Add,
    Sub,
    Mul,
    Eq,
    IsZero,
    Not,
    Eval,
}

impl Word {
    pub const ALL: [Word; 15] = [
        Word::Dup,
        Word::Drop,
        Word::Swap,
        Word::Over,
        Word::Concat,
        Word::Compose,
        Word::Quote,
        Word::Len,
        Word::Add,
        Word::Sub,
        Word::Mul,
        Word::Eq,
        Word::IsZero,
        Word::Not,
        Word::Eval,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Word::Dup => "dup",
            Word::Drop => "drop",
            Word::Swap => "swap",
            Word::Over => "over",
            Word::Concat => "concat",
            Word::Compose => "compose",
            Word::Quote => "quote",
            Word::Len => "len",
            Word::Add => "add",
            Word::Sub => "sub",
            Word::Mul => "mul",
            Word::Eq => "eq",
            Word::IsZero => "iszero",
            Word::Not => "not",
            Word::Eval => "eval",
        }
    }

    pub fn from_name(name: &str) -> Option<Word> {
        Word::ALL.into_iter().find(|word| word.as_str() == name)
    }
}

impl fmt::Display for Word {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Instruction {
    Push(Value),
    Word(Word),
    If { then: Program, otherwise: Program },
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Instruction::Push(value) => write!(f, "{value}"),
            Instruction::Word(word) => write!(f, "{word}"),
            Instruction::If { then, otherwise } => {
                f.write_str("if {")?;
                write_block(f, then)?;
                f.write_str("} else {")?;
                write_block(f, otherwise)?;
                f.write_str("}")
            }
        }
    }
}

fn write_block(f: &mut fmt::Formatter, block: &Program) -> fmt::Result {
    if block.is_empty() {
        f.write_str(" ")
    } else {
        write!(f, " {block} ")
    }
}

/// An ordered list of instructions.
///
/// `Display` produces the canonical description: instructions separated
/// by single spaces. Parsing a description gives back an equal program.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Program {
    instructions: Vec<Instruction>,
}

impl Program {
    pub fn new(instructions: Vec<Instruction>) -> Self {
        Self { instructions }
    }

    /// The program that pushes `text` and does nothing else.
    pub fn printer(text: impl Into<Value>) -> Self {
        Self::new(vec![Instruction::Push(text.into())])
    }

    pub fn words(words: impl IntoIterator<Item = Word>) -> Self {
        Self::new(words.into_iter().map(Instruction::Word).collect())
    }

    pub fn instructions(&self) -> &[Instruction] {
        &self.instructions
    }

    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }

    /// Sequential composition: run `self`, then `next`.
    pub fn then(mut self, next: Program) -> Self {
        self.instructions.extend(next.instructions);
        self
    }
}

impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for (index, instruction) in self.instructions.iter().enumerate() {
            if index > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{instruction}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn word_names_round_trip() {
        for word in Word::ALL {
            assert_eq!(Word::from_name(word.as_str()), Some(word));
        }
        assert_eq!(Word::from_name("fix"), None);
    }

    #[test]
    fn description_spacing() {
        let program = Program::new(vec![
            Instruction::Push(Value::from(3)),
            Instruction::Word(Word::IsZero),
            Instruction::If {
                then: Program::default(),
                otherwise: Program::words([Word::Drop]),
            },
        ]);
        assert_eq!(program.to_string(), "3 iszero if { } else { drop }");
    }

    #[test]
    fn then_concatenates_descriptions() {
        let first = Program::words([Word::Dup, Word::Quote]);
        let second = Program::words([Word::Swap, Word::Compose]);
        let joined = first.clone().then(second.clone());
        assert_eq!(joined.to_string(), format!("{first} {second}"));
        assert_eq!(joined.len(), 4);
    }

    #[test]
    fn printer_quotes_its_text() {
        assert_eq!(Program::printer("a \"b\"").to_string(), r#""a \"b\"""#);
    }
}
