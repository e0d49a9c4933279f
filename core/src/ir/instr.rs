//! file: core/src/ir/instr.rs
//! description: three-address-code instructions and the per-file listing.

/// One line of TAC. Control-flow lines are typed so a consumer can rebuild
/// the control-flow graph from label definitions and jump targets alone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Instruction {
    Label { name: String },
    Goto { target: String },
    IfGoto { condition: String, target: String },
    /// Iterator advance-and-test pseudo instruction.
    Foreach { iterable: String, binding: String, target: String },
    Text { line: String },
}

impl Instruction {
    pub fn label(name: impl Into<String>) -> Self {
        Instruction::Label { name: name.into() }
    }

    pub fn goto(target: impl Into<String>) -> Self {
        Instruction::Goto { target: target.into() }
    }

    pub fn if_goto(condition: impl Into<String>, target: impl Into<String>) -> Self {
        Instruction::IfGoto { condition: condition.into(), target: target.into() }
    }

    pub fn text(line: impl Into<String>) -> Self {
        Instruction::Text { line: line.into() }
    }

    /// Label this instruction may transfer control to, if any.
    pub fn jump_target(&self) -> Option<&str> {
        match self {
            Instruction::Goto { target }
            | Instruction::IfGoto { target, .. }
            | Instruction::Foreach { target, .. } => Some(target),
            _ => None,
        }
    }
}

impl std::fmt::Display for Instruction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Instruction::Label { name } => write!(f, "{}:", name),
            Instruction::Goto { target } => write!(f, "goto {};", target),
            Instruction::IfGoto { condition, target } => write!(f, "if ({}) goto {};", condition, target),
            Instruction::Foreach { iterable, binding, target } => {
                write!(f, "foreach ({} as {}) goto {};", iterable, binding, target)
            }
            Instruction::Text { line } => write!(f, "{}", line),
        }
    }
}

/// Ordered instructions of one translation unit.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Listing {
    instructions: Vec<Instruction>,
}

impl Listing {
    pub fn new(instructions: Vec<Instruction>) -> Self {
        Listing { instructions }
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

    /// Labels defined in the listing, in order of definition.
    pub fn labels(&self) -> Vec<&str> {
        self.instructions
            .iter()
            .filter_map(|i| match i {
                Instruction::Label { name } => Some(name.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Every jump target, in order of appearance.
    pub fn jump_targets(&self) -> Vec<&str> {
        self.instructions.iter().filter_map(Instruction::jump_target).collect()
    }

    /// Rendered lines, one per instruction.
    pub fn lines(&self) -> Vec<String> {
        self.instructions.iter().map(|i| i.to_string()).collect()
    }

    pub fn render(&self) -> String {
        self.lines().join("\n")
    }
}

impl std::fmt::Display for Listing {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.render())
    }
}
