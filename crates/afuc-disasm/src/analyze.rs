use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet, VecDeque};
use serde::Serialize;

use afuc_rs::decoder::Decoder;
use afuc_rs::flow::{instruction_info, BranchKind};
use afuc_rs::AfucDecoder;

use crate::model::{Image, is_mapped, read_u32};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeKind { Fallthrough, Branch, CondBranch, Call }

impl EdgeKind {
    pub fn short(self) -> &'static str {
        match self {
            EdgeKind::Fallthrough => "ft",
            EdgeKind::Branch => "br",
            EdgeKind::CondBranch => "cbr",
            EdgeKind::Call => "call",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Edge { pub from: u32, pub to: u32, pub kind: EdgeKind }

#[derive(Debug, Default)]
pub struct Analysis {
    /// Every decoded word, delay slots included.
    pub visited: BTreeSet<u32>,
    /// Words whose successors were followed.
    pub explored: BTreeSet<u32>,
    pub edges: Vec<Edge>,
    pub rets: BTreeSet<u32>,
    /// Block-ending instruction -> first address after its delay slots.
    pub stops: BTreeMap<u32, u32>,
}

/// Worklist reachability from `entries`, following `flow::instruction_info`.
/// The delay slot of a branch belongs to the branch's block.
pub fn analyze_entries(img: &Image, entries: &[u32], max_instr: usize) -> Analysis {
    let dec = AfucDecoder::new(img.generation);
    let mut a = Analysis::default();
    let mut queue: VecDeque<u32> = VecDeque::new();
    for &e in entries { if is_mapped(img, e) { queue.push_back(e); } }
    let mut steps = 0usize;

    let follow = |queue: &mut VecDeque<u32>, to: u32| {
        if is_mapped(img, to) { queue.push_back(to); }
    };

    while let Some(pc) = queue.pop_front() {
        if steps >= max_instr { break; }
        if !a.explored.insert(pc) { continue; }
        let Some(raw32) = read_u32(img, pc) else { continue; };
        let d = dec.decode(raw32);
        steps += 1;
        a.visited.insert(pc);

        if d.is_invalid() {
            tracing::debug!(pc, raw32, "stopping at invalid word");
            a.stops.insert(pc, pc.wrapping_add(4));
            continue;
        }

        let info = instruction_info(&d, pc);
        let ft = pc.wrapping_add(info.length);
        let end = ft.wrapping_add(info.delay_slots * 4);
        for i in 0..info.delay_slots {
            let slot = ft.wrapping_add(i * 4);
            if is_mapped(img, slot) { a.visited.insert(slot); }
        }

        if info.branches.is_empty() {
            follow(&mut queue, ft);
            continue;
        }
        let mut falls_through = false;
        for b in &info.branches {
            match (b.kind, b.target) {
                (BranchKind::True, Some(t)) => {
                    a.edges.push(Edge { from: pc, to: t, kind: EdgeKind::CondBranch });
                    follow(&mut queue, t);
                }
                (BranchKind::False, Some(t)) => {
                    a.edges.push(Edge { from: pc, to: t, kind: EdgeKind::Fallthrough });
                    follow(&mut queue, t);
                }
                (BranchKind::Unconditional, Some(t)) => {
                    a.edges.push(Edge { from: pc, to: t, kind: EdgeKind::Branch });
                    follow(&mut queue, t);
                }
                (BranchKind::Call, Some(t)) => {
                    a.edges.push(Edge { from: pc, to: t, kind: EdgeKind::Call });
                    follow(&mut queue, t);
                    falls_through = true;
                }
                (BranchKind::Return, _) => { a.rets.insert(pc); }
                _ => {}
            }
        }
        if falls_through {
            follow(&mut queue, ft);
        } else {
            a.stops.insert(pc, end);
        }
    }
    a
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Block { pub start: u32, pub end: u32 }

#[derive(Debug, Clone, Serialize)]
pub struct EdgeOut { pub from: u32, pub to: u32, pub kind: String }

#[derive(Debug, Clone, Serialize)]
pub struct FunctionOut { pub entry: u32, pub blocks: Vec<u32> }

#[derive(Debug, Clone, Serialize)]
pub struct Report<Blk=Block> {
    pub entries: Vec<u32>,
    pub blocks: Vec<Blk>,
    pub edges: Vec<EdgeOut>,
    pub functions: Vec<FunctionOut>,
}

/// Splits explored code into basic blocks and groups them per function.
/// Functions are rooted at the entries and at every call target.
pub fn build_report(entries: &[u32], a: &Analysis) -> Report {
    let mut starts: BTreeSet<u32> = entries.iter().copied().collect();
    starts.extend(a.edges.iter().map(|e| e.to));
    starts.retain(|s| a.explored.contains(s));

    let mut blocks: Vec<Block> = Vec::new();
    let mut implicit: Vec<Edge> = Vec::new();
    let mut addr_to_block: HashMap<u32, u32> = HashMap::new();
    for &start in &starts {
        let mut cur = start;
        let end = loop {
            addr_to_block.insert(cur, start);
            if let Some(&end) = a.stops.get(&cur) { break end; }
            let next = cur.wrapping_add(4);
            if starts.contains(&next) {
                implicit.push(Edge { from: cur, to: next, kind: EdgeKind::Fallthrough });
                break next;
            }
            if !a.explored.contains(&next) { break next; }
            cur = next;
        };
        blocks.push(Block { start, end });
    }

    let mut edges_out: Vec<EdgeOut> = Vec::new();
    for e in a.edges.iter().chain(&implicit) {
        let from = *addr_to_block.get(&e.from).unwrap_or(&e.from);
        edges_out.push(EdgeOut { from, to: e.to, kind: e.kind.short().to_string() });
    }

    let mut roots: Vec<u32> = entries.to_vec();
    roots.extend(a.edges.iter().filter(|e| e.kind == EdgeKind::Call).map(|e| e.to));
    roots.sort_unstable();
    roots.dedup();

    // calls do not extend the caller's body
    let mut adj: HashMap<u32, Vec<u32>> = HashMap::new();
    for e in &edges_out {
        if e.kind != EdgeKind::Call.short() { adj.entry(e.from).or_default().push(e.to); }
    }
    let mut functions: Vec<FunctionOut> = Vec::new();
    for &entry in roots.iter().filter(|r| starts.contains(r)) {
        let mut seen: HashSet<u32> = HashSet::new();
        let mut q = VecDeque::from([entry]);
        while let Some(b) = q.pop_front() {
            if !seen.insert(b) { continue; }
            if let Some(nexts) = adj.get(&b) { q.extend(nexts.iter().copied()); }
        }
        let mut blks: Vec<u32> = seen.into_iter().filter(|b| starts.contains(b)).collect();
        blks.sort_unstable();
        functions.push(FunctionOut { entry, blocks: blks });
    }

    Report { entries: entries.to_vec(), blocks, edges: edges_out, functions }
}
