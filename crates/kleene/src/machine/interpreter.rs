//! Executes programs over a value stack.
//!
//! `eval` is the universal step: it pops a description, parses it and runs
//! the described program on the current stack. Fuel and depth limits keep
//! runaway self-evaluation from hanging or exhausting the native stack.

use super::MachineError;
use super::parser;
use super::program::{Instruction, Program, Word};
use super::value::Value;
use log::{debug, trace};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::collections::HashMap;
use std::rc::Rc;
use std::sync::Arc;

pub const DEFAULT_MAX_STEPS: u64 = 100_000;
pub const DEFAULT_MAX_DEPTH: usize = 256;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Limits {
    /// Instructions executed per run, nested ones included.
    pub max_steps: u64,
    /// Nesting of `eval`.
    pub max_depth: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_steps: DEFAULT_MAX_STEPS,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

pub type Stack = SmallVec<[Value; 8]>;

pub struct Machine {
    limits: Limits,
    steps: u64,
    depth: usize,
    // Parsed descriptions keyed by their text
    descriptions: HashMap<Arc<str>, Rc<Program>>,
}

impl Machine {
    pub fn new(limits: Limits) -> Self {
        Self {
            limits,
            steps: 0,
            depth: 0,
            descriptions: HashMap::new(),
        }
    }

    /// Steps taken by the most recent run.
    pub fn steps(&self) -> u64 {
        self.steps
    }

    /// Runs `program` with `input` as the initial stack (last item on top)
    /// and returns the final stack.
    pub fn run(
        &mut self,
        program: &Program,
        input: impl IntoIterator<Item = Value>,
    ) -> Result<Vec<Value>, MachineError> {
        self.steps = 0;
        self.depth = 0;
        let mut stack: Stack = input.into_iter().collect();
        debug!(
            "Running {} instructions on {} inputs",
            program.len(),
            stack.len()
        );
        let result = self.execute(program, &mut stack);
        match &result {
            Ok(()) => debug!("Halted after {} steps", self.steps),
            Err(error) => debug!("Failed after {} steps: {error}", self.steps),
        }
        result.map(|()| stack.into_vec())
    }

    fn execute(&mut self, program: &Program, stack: &mut Stack) -> Result<(), MachineError> {
        for instruction in program.instructions() {
            self.tick()?;
            match instruction {
                Instruction::Push(value) => stack.push(value.clone()),
                Instruction::Word(word) => self.word(*word, stack)?,
                Instruction::If { then, otherwise } => {
                    let condition = pop_bool(stack, "if")?;
                    self.execute(if condition { then } else { otherwise }, stack)?;
                }
            }
        }
        Ok(())
    }

    fn tick(&mut self) -> Result<(), MachineError> {
        self.steps += 1;
        if self.steps > self.limits.max_steps {
            return Err(MachineError::OutOfFuel {
                limit: self.limits.max_steps,
            });
        }
        Ok(())
    }

    fn word(&mut self, word: Word, stack: &mut Stack) -> Result<(), MachineError> {
        let name = word.as_str();
        match word {
            Word::Dup => {
                require(stack, name, 1)?;
                let top = stack[stack.len() - 1].clone();
                stack.push(top);
            }
            Word::Drop => {
                pop(stack, name)?;
            }
            Word::Swap => {
                require(stack, name, 2)?;
                let len = stack.len();
                stack.swap(len - 1, len - 2);
            }
            Word::Over => {
                require(stack, name, 2)?;
                let second = stack[stack.len() - 2].clone();
                stack.push(second);
            }
            Word::Concat => {
                require(stack, name, 2)?;
                let right = pop_text(stack, name)?;
                let left = pop_text(stack, name)?;
                stack.push(Value::from(format!("{left}{right}")));
            }
            Word::Compose => {
                require(stack, name, 2)?;
                let second = pop_text(stack, name)?;
                let first = pop_text(stack, name)?;
                let composed = match (first.is_empty(), second.is_empty()) {
                    (true, _) => second.to_string(),
                    (_, true) => first.to_string(),
                    _ => format!("{first} {second}"),
                };
                stack.push(Value::from(composed));
            }
            Word::Quote => {
                let text = pop_text(stack, name)?;
                stack.push(Value::from(Program::printer(Value::Text(text)).to_string()));
            }
            Word::Len => {
                let text = pop_text(stack, name)?;
                let len = i64::try_from(text.chars().count())
                    .map_err(|_| MachineError::Overflow { word: name })?;
                stack.push(Value::Int(len));
            }
            Word::Add | Word::Sub | Word::Mul => {
                require(stack, name, 2)?;
                let right = pop_int(stack, name)?;
                let left = pop_int(stack, name)?;
                let result = match word {
                    Word::Add => left.checked_add(right),
                    Word::Sub => left.checked_sub(right),
                    _ => left.checked_mul(right),
                };
                stack.push(Value::Int(
                    result.ok_or(MachineError::Overflow { word: name })?,
                ));
            }
            Word::Eq => {
                require(stack, name, 2)?;
                let right = pop(stack, name)?;
                let left = pop(stack, name)?;
                stack.push(Value::Bool(left == right));
            }
            Word::IsZero => {
                let number = pop_int(stack, name)?;
                stack.push(Value::Bool(number == 0));
            }
            Word::Not => {
                let boolean = pop_bool(stack, name)?;
                stack.push(Value::Bool(!boolean));
            }
            Word::Eval => {
                let description = pop_text(stack, name)?;
                self.eval(description, stack)?;
            }
        }
        Ok(())
    }

    fn eval(&mut self, description: Arc<str>, stack: &mut Stack) -> Result<(), MachineError> {
        if self.depth >= self.limits.max_depth {
            return Err(MachineError::DepthExceeded {
                limit: self.limits.max_depth,
            });
        }
        let program = match self.descriptions.get(&description) {
            Some(program) => Rc::clone(program),
            None => {
                let program = parser::parse(&description)
                    .map_err(|errors| MachineError::InvalidDescription { errors })?;
                let program = Rc::new(program);
                self.descriptions
                    .insert(Arc::clone(&description), Rc::clone(&program));
                program
            }
        };
        trace!(
            "eval at depth {} with {} values on the stack",
            self.depth + 1,
            stack.len()
        );
        self.depth += 1;
        let result = self.execute(&program, stack);
        self.depth -= 1;
        result
    }
}

impl Default for Machine {
    fn default() -> Self {
        Self::new(Limits::default())
    }
}

fn require(stack: &Stack, word: &'static str, needed: usize) -> Result<(), MachineError> {
    if stack.len() < needed {
        return Err(MachineError::StackUnderflow {
            word,
            needed,
            available: stack.len(),
        });
    }
    Ok(())
}

fn pop(stack: &mut Stack, word: &'static str) -> Result<Value, MachineError> {
    stack.pop().ok_or(MachineError::StackUnderflow {
        word,
        needed: 1,
        available: 0,
    })
}

fn mismatch(word: &'static str, expected: &'static str, found: &Value) -> MachineError {
    MachineError::TypeMismatch {
        word,
        expected,
        found: found.type_name(),
    }
}

fn pop_int(stack: &mut Stack, word: &'static str) -> Result<i64, MachineError> {
    match pop(stack, word)? {
        Value::Int(number) => Ok(number),
        other => Err(mismatch(word, "int", &other)),
    }
}

fn pop_bool(stack: &mut Stack, word: &'static str) -> Result<bool, MachineError> {
    match pop(stack, word)? {
        Value::Bool(boolean) => Ok(boolean),
        other => Err(mismatch(word, "bool", &other)),
    }
}

fn pop_text(stack: &mut Stack, word: &'static str) -> Result<Arc<str>, MachineError> {
    match pop(stack, word)? {
        Value::Text(text) => Ok(text),
        other => Err(mismatch(word, "text", &other)),
    }
}
