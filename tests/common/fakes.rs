//! Fakes for the side-effect ports

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Mutex;

use wadf::domain::ports::{
    CommandOutput, CommandRunner, CommandSpec, InputPrompter, InputRequest,
};
use wadf::WadfResult;

/// Answers commands whose rendered form starts with a registered prefix;
/// anything else succeeds with no output
#[derive(Default)]
pub struct FakeRunner {
    responses: Vec<(String, CommandOutput)>,
    calls: Mutex<Vec<CommandSpec>>,
}

impl FakeRunner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on(mut self, prefix: &str, output: CommandOutput) -> Self {
        self.responses.push((prefix.to_string(), output));
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.specs().iter().map(ToString::to_string).collect()
    }

    pub fn specs(&self) -> Vec<CommandSpec> {
        self.calls.lock().unwrap().clone()
    }

    fn respond(&self, spec: &CommandSpec) -> CommandOutput {
        self.calls.lock().unwrap().push(spec.clone());
        let rendered = spec.to_string();
        self.responses
            .iter()
            .find(|(prefix, _)| rendered.starts_with(prefix.as_str()))
            .map(|(_, out)| out.clone())
            .unwrap_or_else(|| CommandOutput::ok(""))
    }
}

impl CommandRunner for FakeRunner {
    fn run(&self, spec: &CommandSpec) -> WadfResult<CommandOutput> {
        Ok(self.respond(spec))
    }

    fn run_attached(&self, spec: &CommandSpec) -> WadfResult<Option<i32>> {
        Ok(self.respond(spec).status)
    }
}

/// Hands out answers in order and remembers what was asked. Clones share
/// their state, so a test can keep one while the use case owns another.
#[derive(Clone, Default)]
pub struct ScriptedPrompter {
    answers: Rc<RefCell<Vec<String>>>,
    asked: Rc<RefCell<Vec<InputRequest>>>,
}

impl ScriptedPrompter {
    pub fn answering(answers: &[&str]) -> Self {
        Self {
            answers: Rc::new(RefCell::new(
                answers.iter().rev().map(|a| a.to_string()).collect(),
            )),
            asked: Rc::default(),
        }
    }

    pub fn asked(&self) -> Vec<InputRequest> {
        self.asked.borrow().clone()
    }
}

impl InputPrompter for ScriptedPrompter {
    fn prompt(&self, request: &InputRequest) -> WadfResult<Option<String>> {
        self.asked.borrow_mut().push(request.clone());
        Ok(self.answers.borrow_mut().pop())
    }
}
