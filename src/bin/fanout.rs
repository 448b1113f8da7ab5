use std::io::{self, BufRead};

use fanout::history::{History, Op};
use fanout::tree::Tree;
use fanout::{input, viz};
use log::debug;

fn usage() -> ! {
    eprintln!("fanout [fan-out]");
    std::process::exit(1);
}

const DEFAULT_FAN_OUT: usize = 2;

fn main() {
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let fan_out = match args.next() {
        None => DEFAULT_FAN_OUT,
        Some(arg) => match arg.parse() {
            Ok(fan_out) if fan_out >= 1 => fan_out,
            _ => {
                eprintln!("fanout: fan-out must be a positive integer");
                usage();
            }
        },
    };
    if args.next().is_some() {
        eprintln!("fanout: too many arguments");
        usage();
    }

    let mut shell = Shell::new(fan_out);

    let stdin = io::stdin();
    for line in stdin.lock().lines() {
        let line = match line {
            Ok(line) => line,
            Err(_) => break,
        };
        if !shell.handle(&line) {
            break;
        }
    }
}

struct Shell {
    tree: Tree,
    history: History,
}

impl Shell {
    fn new(fan_out: usize) -> Self {
        let mut history = History::new();
        history.push(Op::Reset { fan_out });
        Self {
            tree: Tree::new(fan_out),
            history,
        }
    }

    /// Executes one command line. Returns `false` once the shell should
    /// terminate.
    fn handle(&mut self, line: &str) -> bool {
        let mut parts = line.split_whitespace();
        let command = match parts.next() {
            Some(command) => command,
            None => return true,
        };
        let rest: Vec<_> = parts.collect();

        match (command, rest.as_slice()) {
            ("insert", tokens) if !tokens.is_empty() => match input::parse_values(&tokens.concat())
            {
                Ok(values) => self.insert_all(&values),
                Err(err) => eprintln!("insert failed: {err}"),
            },
            ("delete", tokens) if !tokens.is_empty() => match input::parse_values(&tokens.concat())
            {
                Ok(values) => self.delete_all(&values),
                Err(err) => eprintln!("delete failed: {err}"),
            },
            ("search", [value]) => match value.parse() {
                Ok(value) => self.search(value),
                Err(_) => eprintln!("search failed: \"{value}\" is not an integer"),
            },
            ("reset", [fan_out]) => match fan_out.parse() {
                Ok(fan_out) if fan_out >= 1 => self.reset(fan_out),
                _ => eprintln!("reset failed: fan-out must be a positive integer"),
            },
            ("random", [min, max, count]) => {
                match (min.parse(), max.parse(), count.parse()) {
                    (Ok(min), Ok(max), Ok(count)) => self.random(min, max, count),
                    _ => eprintln!("random failed: expected integer MIN MAX COUNT"),
                }
            }
            ("import", [path]) => self.import(path),
            ("values", []) => {
                let values: Vec<_> = self.tree.in_order().iter().map(i64::to_string).collect();
                println!("values: {}", values.join(", "));
            }
            ("dot", []) => print!("{}", viz::to_dot(&self.tree)),
            ("history", []) => {
                for (step, op) in self.history.ops().iter().enumerate() {
                    println!("{step}: {op}");
                }
            }
            ("restore", [step]) => match step.parse() {
                Ok(step) => self.restore(step),
                Err(_) => eprintln!("restore failed: \"{step}\" is not a step number"),
            },
            ("quit" | "exit", []) => return false,
            _ => eprintln!("unknown command: {line}"),
        }
        true
    }

    /// Rebuilds the tree from the tip of the history. A `restore` may have
    /// left an older state on display; mutations always continue from the
    /// latest one.
    fn rematerialize(&mut self) {
        self.tree = self
            .history
            .replay(self.history.len() - 1)
            .expect("every recorded operation replays cleanly");
    }

    fn insert_all(&mut self, values: &[i64]) {
        for &value in values {
            self.rematerialize();
            match self.tree.insert(value) {
                Ok(()) => {
                    self.history.push(Op::Insert(value));
                    println!("inserted {value}");
                }
                Err(err) => eprintln!("insert {value} failed: {err}"),
            }
        }
    }

    fn delete_all(&mut self, values: &[i64]) {
        for &value in values {
            self.rematerialize();
            match self.tree.delete(value) {
                Ok(()) => {
                    self.history.push(Op::Delete(value));
                    println!("deleted {value}");
                }
                Err(err) => eprintln!("delete {value} failed: {err}"),
            }
        }
    }

    fn search(&self, value: i64) {
        let outcome = self.tree.search(value);
        let node = self.tree.node(outcome.node);
        println!(
            "search {value}: found={} node={:?} accesses={}",
            outcome.found,
            node.values(),
            outcome.access_count
        );
    }

    fn reset(&mut self, fan_out: usize) {
        self.tree = Tree::new(fan_out);
        self.history.clear();
        self.history.push(Op::Reset { fan_out });
        println!("reset with fan-out {fan_out}");
    }

    fn random(&mut self, min: i64, max: i64, count: usize) {
        match input::random_values(min, max, count) {
            Ok(values) => {
                debug!("inserting {count} random values from ({min}, {max}]");
                self.insert_all(&values);
            }
            Err(err) => eprintln!("random failed: {err}"),
        }
    }

    fn import(&mut self, path: &str) {
        match input::import_csv(path) {
            Ok(values) => {
                debug!("importing {} values from {path}", values.len());
                self.insert_all(&values);
                println!("imported {path}");
            }
            Err(err) => eprintln!("import {path} failed: {err}"),
        }
    }

    fn restore(&mut self, step: usize) {
        match self.history.replay(step) {
            Ok(tree) => {
                self.tree = tree;
                println!("restored step {step}");
            }
            Err(err) => eprintln!("restore failed: {err}"),
        }
    }
}
