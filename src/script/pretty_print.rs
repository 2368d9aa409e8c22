//! Human-readable rendering of values, expressions and scripts
//!
//! The output is meant for diagnostics and the CLI's `--print` mode. It looks
//! like a script language but nothing parses it back.

use std::fmt::{self, Display};

use crate::script::action::{Action, HaltScope, Script};
use crate::script::expr::Expr;
use crate::script::pattern::{Pattern, Slot};
use crate::script::value::Value;

impl Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Number(value) => write!(f, "{}", value),
            Value::Duration(interval) => write!(f, "{}", interval),
            Value::EntityRef(id) => write!(f, "{}", id),
            Value::Tag { name, payload } => {
                write!(f, "#{}({})", name, join(payload.iter()))
            }
            Value::Unit => write!(f, "()"),
        }
    }
}

impl Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Const(value) => write!(f, "{}", value),
            Expr::Var(name) => write!(f, "{}", fmt_name(name)),
            Expr::Myself => write!(f, "self"),
            Expr::Field { subject, name } => write!(f, "{}.{}", subject, name),
            Expr::Tag { name, args } => write!(f, "#{}({})", name, join(args.iter())),
        }
    }
}

impl Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Slot::Any => write!(f, "_"),
            Slot::Capture(name) => write!(f, "?{}", name),
            Slot::Equals(expr) => write!(f, "{}", expr),
        }
    }
}

impl Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}({})", self.tag, join(self.slots.iter()))
    }
}

impl Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Wait(interval) => write!(f, "wait {}", interval),
            Action::Trace(expr) => write!(f, "trace {}", expr),
            Action::Transmit { tag, payload } => {
                write!(f, "transmit #{}({})", tag, join(payload.iter()))
            }
            Action::Listen(pattern) => write!(f, "listen {}", pattern),
            Action::Halt(HaltScope::Myself) => write!(f, "halt"),
            Action::Halt(HaltScope::All) => write!(f, "halt all"),
            Action::Assign { name, value } => write!(f, "{} = {}", name, value),
            Action::Spawn { name, .. } => write!(f, "spawn {} do ...", fmt_name(name)),
            Action::Define { name, method } => {
                write!(f, "def {}({}) do ...", fmt_name(name), method.params().join(", "))
            }
            Action::Call { name, args } => {
                write!(f, "call {}({})", fmt_name(name), join(args.iter()))
            }
            Action::Return => write!(f, "return"),
        }
    }
}

impl Script {
    /// One action per line, spawned child scripts indented under their
    /// `spawn ... do` header
    pub fn pretty_print(&self) -> String {
        let mut printer = Printer::default();
        for action in self.body.iter() {
            printer.print_action(action);
        }
        printer.buffer
    }
}

fn join<T: Display>(items: impl Iterator<Item = T>) -> String {
    items.map(|item| item.to_string()).collect::<Vec<_>>().join(", ")
}

fn fmt_name(name: &str) -> String {
    if name.contains(' ') {
        format!("[{}]", name)
    } else {
        name.to_owned()
    }
}

#[derive(Default)]
struct Printer {
    indent: usize,
    buffer: String,
}

impl Printer {
    fn write_indent(&mut self) {
        const INDENT: &str = "    ";
        for _ in 0..self.indent {
            self.buffer.push_str(INDENT);
        }
    }

    fn print_action(&mut self, action: &Action) {
        match action {
            Action::Spawn { name, script } => {
                self.print_block(&format!("spawn {}", fmt_name(name)), script);
            }
            Action::Define { name, method } => {
                let header = format!("def {}({})", fmt_name(name), method.params().join(", "));
                self.print_block(&header, method.script());
            }
            _ => {
                self.write_indent();
                self.buffer.push_str(&format!("{}\n", action));
            }
        }
    }

    fn print_block(&mut self, header: &str, script: &Script) {
        self.write_indent();
        self.buffer.push_str(&format!("{} do\n", header));
        self.indent += 1;
        for child in script.actions() {
            self.print_action(child);
        }
        self.indent -= 1;
        self.write_indent();
        self.buffer.push_str("done\n");
    }
}
