//! Optional persistence of a built ACTION/GOTO table, keyed by a
//! content hash of the grammar that produced it (section 6).
//!
//! No serialization crate is introduced for this: the record is framed
//! by hand with a small length-prefixed binary codec, matching the
//! rest of the toolkit's "no dependency beyond what the teacher stack
//! already carries" posture.

use std::collections::HashMap;
use std::hash::{Hash, Hasher};
use std::io::{self, Read, Write};

use crate::grammar::Grammar;
use crate::lr::{Action, LrTable};
use crate::rule::Assoc;
use crate::symbol::Symbol;

const FORMAT_VERSION: u32 = 1;

#[derive(Debug, Clone, Copy)]
enum EncodedAction {
    Shift(u32),
    Reduce(u32),
    Accept,
    Error,
}

impl From<Action> for EncodedAction {
    fn from(a: Action) -> Self {
        match a {
            Action::Shift(s) => EncodedAction::Shift(s as u32),
            Action::Reduce(r) => EncodedAction::Reduce(r as u32),
            Action::Accept => EncodedAction::Accept,
            Action::Error => EncodedAction::Error,
        }
    }
}

impl From<EncodedAction> for Action {
    fn from(a: EncodedAction) -> Self {
        match a {
            EncodedAction::Shift(s) => Action::Shift(s as usize),
            EncodedAction::Reduce(r) => Action::Reduce(r as usize),
            EncodedAction::Accept => Action::Accept,
            EncodedAction::Error => Action::Error,
        }
    }
}

/// A previously built table, versioned and keyed by a hash of the
/// grammar that produced it. Symbols are stored by name so a cache hit
/// can be replayed against any `Grammar` value whose symbol table
/// assigns the same names, not just the exact `Symbol` handles used
/// when the cache was written.
pub struct TableCache {
    version: u32,
    signature: u64,
    action: Vec<(u32, String, EncodedAction)>,
    goto: Vec<(u32, String, u32)>,
    productions: Vec<(String, Vec<String>)>,
    terminals: Vec<String>,
    nonterminals: Vec<String>,
    precedence: Vec<(String, u32, u8)>,
}

fn assoc_tag(a: Assoc) -> u8 {
    match a {
        Assoc::Left => 0,
        Assoc::Right => 1,
        Assoc::NonAssoc => 2,
    }
}

/// A content hash over the grammar's symbols, productions and
/// precedence declarations. Used to detect a stale cache; a collision
/// is not a correctness concern here, only a (harmless) missed cache
/// hit or a false hit immediately caught by the `productions` replay.
pub fn signature_of(grammar: &Grammar) -> u64 {
    let mut hasher = std::collections::hash_map::DefaultHasher::new();
    let symbols = grammar.symbols();

    for sym in symbols.iter_terminals() {
        symbols.name(sym).hash(&mut hasher);
    }
    for sym in symbols.iter_nonterminals() {
        symbols.name(sym).hash(&mut hasher);
    }
    for rule in grammar.rules().iter() {
        symbols.name(rule.lhs).hash(&mut hasher);
        for s in &rule.rhs {
            symbols.name(*s).hash(&mut hasher);
        }
        rule.prec.level.hash(&mut hasher);
        assoc_tag(rule.prec.assoc).hash(&mut hasher);
    }
    hasher.finish()
}

impl TableCache {
    /// Snapshots a freshly built table for later persistence.
    /// `state_count` is the number of states in the canonical
    /// collection that produced `table` (`graph.sets().len()`).
    pub fn capture(grammar: &Grammar, table: &LrTable, state_count: usize) -> Self {
        let symbols = grammar.symbols();
        let terminals: Vec<Symbol> = symbols.iter_terminals().collect();
        let nonterminals: Vec<Symbol> = symbols.iter_nonterminals().collect();

        let mut action = Vec::new();
        let mut goto = Vec::new();
        for state in 0..state_count {
            for sym in &terminals {
                if let Some(a) = table.action(state, *sym) {
                    action.push((state as u32, symbols.name(*sym).to_string(), a.into()));
                }
            }
            for sym in &nonterminals {
                if let Some(to) = table.goto(state, *sym) {
                    goto.push((state as u32, symbols.name(*sym).to_string(), to as u32));
                }
            }
        }

        let productions = grammar
            .rules()
            .iter()
            .map(|r| (symbols.name(r.lhs).to_string(), r.rhs.iter().map(|s| symbols.name(*s).to_string()).collect()))
            .collect();

        let precedence = terminals
            .iter()
            .filter_map(|s| {
                let p = grammar.precedence_of(*s);
                p.has_precedence()
                    .then(|| (symbols.name(*s).to_string(), p.level, assoc_tag(p.assoc)))
            })
            .collect();

        Self {
            version: FORMAT_VERSION,
            signature: signature_of(grammar),
            action,
            goto,
            productions,
            terminals: terminals.iter().map(|s| symbols.name(*s).to_string()).collect(),
            nonterminals: nonterminals.iter().map(|s| symbols.name(*s).to_string()).collect(),
            precedence,
        }
    }

    /// `false` means this cache cannot safely be reused for `grammar`
    /// (a version bump or content mismatch): treat as a plain miss.
    pub fn matches(&self, grammar: &Grammar) -> bool {
        self.version == FORMAT_VERSION && self.signature == signature_of(grammar)
    }

    /// Replays a cache hit into a live [`LrTable`] against `grammar`'s
    /// own symbol table.
    pub fn to_table(&self, grammar: &Grammar) -> Option<LrTable> {
        let symbols = grammar.symbols();
        let mut action_map = HashMap::new();
        for (state, name, encoded) in &self.action {
            let sym = symbols.get_by_name(name)?;
            action_map.insert((*state as usize, sym), Action::from(*encoded));
        }
        let mut goto_map = HashMap::new();
        for (state, name, to) in &self.goto {
            let sym = symbols.get_by_name(name)?;
            goto_map.insert((*state as usize, sym), *to as usize);
        }
        Some(LrTable::from_parts(action_map, goto_map))
    }

    pub fn save(&self, mut w: impl Write) -> io::Result<()> {
        write_u32(&mut w, self.version)?;
        write_u64(&mut w, self.signature)?;

        write_u32(&mut w, self.action.len() as u32)?;
        for (state, name, act) in &self.action {
            write_u32(&mut w, *state)?;
            write_str(&mut w, name)?;
            match act {
                EncodedAction::Shift(to) => {
                    w.write_all(&[0])?;
                    write_u32(&mut w, *to)?;
                }
                EncodedAction::Reduce(r) => {
                    w.write_all(&[1])?;
                    write_u32(&mut w, *r)?;
                }
                EncodedAction::Accept => w.write_all(&[2])?,
                EncodedAction::Error => w.write_all(&[3])?,
            }
        }

        write_u32(&mut w, self.goto.len() as u32)?;
        for (state, name, to) in &self.goto {
            write_u32(&mut w, *state)?;
            write_str(&mut w, name)?;
            write_u32(&mut w, *to)?;
        }

        write_u32(&mut w, self.productions.len() as u32)?;
        for (lhs, rhs) in &self.productions {
            write_str(&mut w, lhs)?;
            write_u32(&mut w, rhs.len() as u32)?;
            for s in rhs {
                write_str(&mut w, s)?;
            }
        }

        write_u32(&mut w, self.terminals.len() as u32)?;
        for t in &self.terminals {
            write_str(&mut w, t)?;
        }
        write_u32(&mut w, self.nonterminals.len() as u32)?;
        for n in &self.nonterminals {
            write_str(&mut w, n)?;
        }

        write_u32(&mut w, self.precedence.len() as u32)?;
        for (name, level, assoc) in &self.precedence {
            write_str(&mut w, name)?;
            write_u32(&mut w, *level)?;
            w.write_all(&[*assoc])?;
        }

        Ok(())
    }

    pub fn load(mut r: impl Read) -> io::Result<Self> {
        let version = read_u32(&mut r)?;
        let signature = read_u64(&mut r)?;

        let action_len = read_u32(&mut r)?;
        let mut action = Vec::with_capacity(action_len as usize);
        for _ in 0..action_len {
            let state = read_u32(&mut r)?;
            let name = read_str(&mut r)?;
            let mut tag = [0u8; 1];
            r.read_exact(&mut tag)?;
            let act = match tag[0] {
                0 => EncodedAction::Shift(read_u32(&mut r)?),
                1 => EncodedAction::Reduce(read_u32(&mut r)?),
                2 => EncodedAction::Accept,
                _ => EncodedAction::Error,
            };
            action.push((state, name, act));
        }

        let goto_len = read_u32(&mut r)?;
        let mut goto = Vec::with_capacity(goto_len as usize);
        for _ in 0..goto_len {
            let state = read_u32(&mut r)?;
            let name = read_str(&mut r)?;
            let to = read_u32(&mut r)?;
            goto.push((state, name, to));
        }

        let prod_len = read_u32(&mut r)?;
        let mut productions = Vec::with_capacity(prod_len as usize);
        for _ in 0..prod_len {
            let lhs = read_str(&mut r)?;
            let rhs_len = read_u32(&mut r)?;
            let mut rhs = Vec::with_capacity(rhs_len as usize);
            for _ in 0..rhs_len {
                rhs.push(read_str(&mut r)?);
            }
            productions.push((lhs, rhs));
        }

        let terminals_len = read_u32(&mut r)?;
        let mut terminals = Vec::with_capacity(terminals_len as usize);
        for _ in 0..terminals_len {
            terminals.push(read_str(&mut r)?);
        }
        let nonterminals_len = read_u32(&mut r)?;
        let mut nonterminals = Vec::with_capacity(nonterminals_len as usize);
        for _ in 0..nonterminals_len {
            nonterminals.push(read_str(&mut r)?);
        }

        let prec_len = read_u32(&mut r)?;
        let mut precedence = Vec::with_capacity(prec_len as usize);
        for _ in 0..prec_len {
            let name = read_str(&mut r)?;
            let level = read_u32(&mut r)?;
            let mut tag = [0u8; 1];
            r.read_exact(&mut tag)?;
            precedence.push((name, level, tag[0]));
        }

        Ok(Self {
            version,
            signature,
            action,
            goto,
            productions,
            terminals,
            nonterminals,
            precedence,
        })
    }
}

fn write_u32(w: &mut impl Write, v: u32) -> io::Result<()> {
    w.write_all(&v.to_le_bytes())
}

fn write_u64(w: &mut impl Write, v: u64) -> io::Result<()> {
    w.write_all(&v.to_le_bytes())
}

fn write_str(w: &mut impl Write, s: &str) -> io::Result<()> {
    write_u32(w, s.len() as u32)?;
    w.write_all(s.as_bytes())
}

fn read_u32(r: &mut impl Read) -> io::Result<u32> {
    let mut buf = [0u8; 4];
    r.read_exact(&mut buf)?;
    Ok(u32::from_le_bytes(buf))
}

fn read_u64(r: &mut impl Read) -> io::Result<u64> {
    let mut buf = [0u8; 8];
    r.read_exact(&mut buf)?;
    Ok(u64::from_le_bytes(buf))
}

fn read_str(r: &mut impl Read) -> io::Result<String> {
    let len = read_u32(r)? as usize;
    let mut buf = vec![0u8; len];
    r.read_exact(&mut buf)?;
    String::from_utf8(buf).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::arithmetic_grammar;
    use crate::grammar::GrammarBuilder;
    use crate::rule::action_fn;

    #[test]
    fn round_trips_through_the_binary_codec() {
        let grammar = arithmetic_grammar();
        let (_, table) = crate::lr::build_from_grammar(&grammar);
        let cache = TableCache::capture(&grammar, &table, 32);

        let mut buf = Vec::new();
        cache.save(&mut buf).unwrap();
        let loaded = TableCache::load(&buf[..]).unwrap();

        assert!(loaded.matches(&grammar));
        let rebuilt = loaded.to_table(&grammar).expect("symbols resolve");
        for sym in grammar.symbols().iter_terminals() {
            assert_eq!(table.action(0, sym), rebuilt.action(0, sym));
        }
    }

    #[test]
    fn a_changed_grammar_misses_the_cache() {
        let grammar = arithmetic_grammar();
        let (_, table) = crate::lr::build_from_grammar(&grammar);
        let cache = TableCache::capture(&grammar, &table, 32);

        let mut other: GrammarBuilder<i64, crate::error::NoCustomError> = GrammarBuilder::new();
        other.token("n");
        other.token("m");
        other.production("E", &["n"], action_fn(|_, mut args| Ok(args.pop().unwrap())));
        let (other_grammar, _) = other.build().unwrap();

        assert!(!cache.matches(&other_grammar));
    }
}
