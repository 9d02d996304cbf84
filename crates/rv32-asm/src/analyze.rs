use std::collections::{BTreeSet, HashSet, VecDeque};

use serde::Serialize;

use rv32_sim::{Op, Program};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum EdgeKind {
    Fallthrough,
    Branch,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Edge {
    pub from: u32,
    pub to: u32,
    pub kind: EdgeKind,
}

/// Instructions `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Block {
    pub start: u32,
    pub end: u32,
}

/// A branch whose label is not bound; it never jumps at runtime.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Unresolved {
    pub index: u32,
    pub label: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Report {
    pub blocks: Vec<Block>,
    pub edges: Vec<Edge>,
    /// Indices of `ecall`s.
    pub halts: Vec<u32>,
    pub unresolved: Vec<Unresolved>,
    /// Indices not reachable from index 0.
    pub unreachable: Vec<u32>,
}

/// Branch destination by program index, `None` when it leaves the program
/// or the label is unknown.
fn branch_target(program: &Program, index: u32) -> Option<u32> {
    let insn = program.get(index)?;
    let target = match &insn.target {
        Some(label) => program.labels().get(label)?,
        None => index.wrapping_add(1).wrapping_add(insn.imm as u32),
    };
    ((target as usize) < program.len()).then_some(target)
}

pub fn analyze(program: &Program) -> Report {
    let len = program.len() as u32;
    let mut report = Report::default();
    let mut leaders: BTreeSet<u32> = BTreeSet::new();
    if len > 0 {
        leaders.insert(0);
    }

    for (i, insn) in program.instructions().iter().enumerate() {
        let i = i as u32;
        let next = i + 1;
        if insn.op == Op::Ecall {
            report.halts.push(i);
            if next < len {
                leaders.insert(next);
            }
            continue;
        }
        if insn.op.is_branch() {
            if let Some(label) = insn.target.as_ref().filter(|l| !program.labels().contains(l)) {
                report.unresolved.push(Unresolved {
                    index: i,
                    label: label.clone(),
                });
            }
            if let Some(to) = branch_target(program, i) {
                report.edges.push(Edge {
                    from: i,
                    to,
                    kind: EdgeKind::Branch,
                });
                leaders.insert(to);
            }
            if next < len {
                leaders.insert(next);
            }
        }
        if next < len {
            report.edges.push(Edge {
                from: i,
                to: next,
                kind: EdgeKind::Fallthrough,
            });
        }
    }

    let starts: Vec<u32> = leaders.into_iter().collect();
    report.blocks = starts
        .iter()
        .enumerate()
        .map(|(k, &start)| Block {
            start,
            end: starts.get(k + 1).copied().unwrap_or(len),
        })
        .collect();

    let mut seen: HashSet<u32> = HashSet::new();
    let mut queue: VecDeque<u32> = VecDeque::new();
    if len > 0 {
        queue.push_back(0);
    }
    while let Some(at) = queue.pop_front() {
        if !seen.insert(at) {
            continue;
        }
        for e in report.edges.iter().filter(|e| e.from == at) {
            if !seen.contains(&e.to) {
                queue.push_back(e.to);
            }
        }
    }
    report.unreachable = (0..len).filter(|i| !seen.contains(i)).collect();
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rv32_sim::{SimConfig, Simulator};

    fn program(src: &str) -> Program {
        let mut sim = Simulator::new(SimConfig::default());
        sim.load_source(src);
        sim.program().clone()
    }

    #[test]
    fn loop_blocks_and_edges() {
        let p = program(
            ".text
                 li x1, 0
                 li x2, 3
             loop:
                 addi x1, x1, 1
                 bne x1, x2, loop
                 ecall",
        );
        let r = analyze(&p);
        assert_eq!(
            r.blocks,
            vec![
                Block { start: 0, end: 2 },
                Block { start: 2, end: 4 },
                Block { start: 4, end: 5 }
            ]
        );
        assert!(r.edges.contains(&Edge {
            from: 3,
            to: 2,
            kind: EdgeKind::Branch
        }));
        assert!(r.edges.contains(&Edge {
            from: 3,
            to: 4,
            kind: EdgeKind::Fallthrough
        }));
        assert_eq!(r.halts, vec![4]);
        assert!(r.unreachable.is_empty());
    }

    #[test]
    fn numeric_offsets_unresolved_labels_and_dead_code() {
        let p = program(
            ".text
                 beq x0, x0, 1
                 ecall
                 bne x1, x2, nowhere
                 ecall
                 addi x3, x0, 1",
        );
        let r = analyze(&p);
        assert!(r.edges.contains(&Edge {
            from: 0,
            to: 2,
            kind: EdgeKind::Branch
        }));
        assert_eq!(
            r.unresolved,
            vec![Unresolved {
                index: 2,
                label: "nowhere".into()
            }]
        );
        assert_eq!(r.halts, vec![1, 3]);
        assert_eq!(r.unreachable, vec![4]);
    }

    #[test]
    fn empty_program() {
        let r = analyze(&Program::default());
        assert_eq!(r, Report::default());
    }
}
