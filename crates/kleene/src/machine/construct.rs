//! Programs that obtain their own description.
//!
//! A program `t` that expects its own description on top of the stack is
//! turned into a program `R` that supplies it. `R` is the sequence
//! `A ; B ; t`:
//!
//! - `B` = `dup quote swap compose`. With the text `⟨B ; t⟩` on top it
//!   computes `quote(⟨B ; t⟩)`, which is `⟨A⟩`, and joins the two into `⟨R⟩`.
//! - `A` = the printer of `⟨B ; t⟩`.
//!
//! Running `R` on a stack `S` therefore runs `t` on `S ++ [⟨R⟩]`.

use super::program::{Instruction, Program, Word};
use super::value::Value;

/// `B`: rebuilds the whole description from the description of its tail.
pub fn self_locator() -> Program {
    Program::words([Word::Dup, Word::Quote, Word::Swap, Word::Compose])
}

/// The program that pushes `text`. `quote` computes its description.
pub fn printer(text: &str) -> Program {
    Program::printer(text)
}

/// Builds `R` with `run(R, S) == run(t, S ++ [⟨R⟩])`.
pub fn recursion_theorem(t: &Program) -> Program {
    let tail = self_locator().then(t.clone());
    printer(&tail.to_string()).then(tail)
}

/// Same construction under the closure-side name.
pub fn fixpoint(t: &Program) -> Program {
    recursion_theorem(t)
}

/// A program whose only output is its own description.
pub fn quine() -> Program {
    recursion_theorem(&Program::default())
}

/// Factorial against its own description: `[n, ⟨self⟩] -> [n!]`.
///
/// For `n > 0` it evaluates `⟨self⟩` on `n - 1` and multiplies.
pub fn factorial_step() -> Program {
    Program::new(vec![
        Instruction::Word(Word::Over),
        Instruction::Word(Word::IsZero),
        Instruction::If {
            then: Program::new(vec![
                Instruction::Word(Word::Drop),
                Instruction::Word(Word::Drop),
                Instruction::Push(Value::Int(1)),
            ]),
            otherwise: Program::new(vec![
                Instruction::Word(Word::Over),
                Instruction::Push(Value::Int(1)),
                Instruction::Word(Word::Sub),
                Instruction::Word(Word::Swap),
                Instruction::Word(Word::Eval),
                Instruction::Word(Word::Mul),
            ]),
        },
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::machine::{Machine, MachineError, parse};

    #[test]
    fn quine_prints_itself() {
        let quine = quine();
        let output = Machine::default().run(&quine, []).unwrap();
        assert_eq!(output, vec![Value::from(quine.to_string())]);
    }

    #[test]
    fn quine_description() {
        assert_eq!(
            quine().to_string(),
            r#""dup quote swap compose" dup quote swap compose"#
        );
    }

    #[test]
    fn recursion_theorem_hands_t_its_own_description() {
        // t moves the description under the input
        let r = recursion_theorem(&Program::words([Word::Swap]));
        let output = Machine::default().run(&r, [Value::from(9)]).unwrap();
        assert_eq!(output, vec![Value::from(r.to_string()), Value::from(9)]);
    }

    #[test]
    fn factorial_fixpoint() {
        let factorial = fixpoint(&factorial_step());
        let mut machine = Machine::default();
        assert_eq!(machine.run(&factorial, [Value::from(5)]), Ok(vec![Value::from(120)]));
        assert_eq!(machine.run(&factorial, [Value::from(0)]), Ok(vec![Value::from(1)]));
        assert_eq!(
            machine.run(&factorial, [Value::from(20)]),
            Ok(vec![Value::from(2_432_902_008_176_640_000)])
        );
    }

    #[test]
    fn factorial_fixpoint_overflows_past_twenty() {
        let factorial = fixpoint(&factorial_step());
        assert_eq!(
            Machine::default().run(&factorial, [Value::from(21)]),
            Err(MachineError::Overflow { word: "mul" })
        );
    }

    #[test]
    fn constructions_survive_a_parse() {
        for program in [quine(), fixpoint(&factorial_step()), printer("a\n\"b\"")] {
            assert_eq!(parse(&program.to_string()), Ok(program));
        }
    }
}
