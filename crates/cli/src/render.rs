use nodefinder_search::{Field, Projection};
use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};
use std::io::{self, Write};

const RULE_WIDTH: usize = 60;
const LABEL_WIDTH: usize = 15;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// Every fact, one labelled line each, nodes separated by rules.
    Human,
    /// Values of one field only, undecorated.
    Field(Field),
    /// `/etc/bat-hosts` lines for every secondary MAC.
    BatHosts,
    Json,
}

impl OutputMode {
    pub fn is_machine_readable(self) -> bool {
        !matches!(self, OutputMode::Human)
    }
}

pub fn render<'a, W: Write>(
    out: &mut W,
    mode: OutputMode,
    projections: impl Iterator<Item = Projection<'a>>,
) -> io::Result<()> {
    match mode {
        OutputMode::Human => {
            for projection in projections {
                write_rule(out)?;
                write_human(out, &projection)?;
            }
            write_rule(out)?;
        }
        OutputMode::Field(field) => {
            for projection in projections {
                for fact in projection.facts().filter(|fact| fact.field == field) {
                    writeln!(out, "{}", fact.value)?;
                }
            }
        }
        OutputMode::BatHosts => {
            for projection in projections {
                write_bat_hosts(out, &projection)?;
            }
        }
        OutputMode::Json => write_json(out, projections)?,
    }
    out.flush()
}

fn write_rule<W: Write>(out: &mut W) -> io::Result<()> {
    writeln!(out, "{}", "-".repeat(RULE_WIDTH))
}

fn write_human<W: Write>(out: &mut W, projection: &Projection<'_>) -> io::Result<()> {
    for fact in projection.facts() {
        writeln!(out, "{:>width$}: {}", fact.field, fact.value, width = LABEL_WIDTH)?;
    }
    Ok(())
}

// `<mac> <hostname>_(<first letter of interface>)<n>`, n counting the
// node's secondary MACs from 1.
fn write_bat_hosts<W: Write>(out: &mut W, projection: &Projection<'_>) -> io::Result<()> {
    let mut hostname = String::new();
    let mut counter = 0usize;
    for fact in projection.facts() {
        match fact.field {
            Field::Hostname => hostname = fact.value.to_string().replace(' ', "_"),
            Field::SecondaryMac => {
                counter += 1;
                let text = fact.value.to_string();
                let mut parts = text.split(' ');
                let (Some(mac), Some(tag)) = (
                    parts.next(),
                    parts.next().and_then(|iface| iface.chars().nth(1)),
                ) else {
                    continue;
                };
                writeln!(out, "{mac} {hostname}_({tag}){counter}")?;
            }
            _ => {}
        }
    }
    Ok(())
}

// Serialized as `{"facts": [...]}`, facts produced while writing.
struct NodeFacts<'a>(Projection<'a>);

struct FactStream<'a>(Projection<'a>);

impl Serialize for NodeFacts<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("NodeFacts", 1)?;
        state.serialize_field("facts", &FactStream(self.0))?;
        state.end()
    }
}

impl Serialize for FactStream<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.0.facts())
    }
}

fn write_json<'a, W: Write>(
    out: &mut W,
    projections: impl Iterator<Item = Projection<'a>>,
) -> io::Result<()> {
    let mut serializer = serde_json::Serializer::pretty(&mut *out);
    serializer.collect_seq(projections.map(NodeFacts))?;
    writeln!(out)
}
