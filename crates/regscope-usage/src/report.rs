use std::cmp::Reverse;
use std::io::{self, Write};

use serde::Serialize;

use regscope_types::ProjectUsage;

use crate::aggregate::{rank, total_usage};
use crate::format::format_size;

/// Outcome of one run
#[derive(Clone, Debug)]
pub struct Report {
    /// Session the data was read with (`oc whoami -c`)
    pub identity: String,
    /// Registry address images were filtered on
    pub registry: String,
    /// Usage per project, in project listing order
    pub projects: Vec<ProjectUsage>,
}

/// JSON document shape
#[derive(Serialize)]
struct ReportDocument<'a> {
    identity: &'a str,
    registry: &'a str,
    projects: Vec<&'a ProjectUsage>,
    total: u64,
}

impl Report {
    pub fn new(identity: impl Into<String>, registry: impl Into<String>) -> Self {
        Self {
            identity: identity.into(),
            registry: registry.into(),
            projects: Vec::new(),
        }
    }

    pub fn push(&mut self, usage: ProjectUsage) {
        self.projects.push(usage);
    }

    /// Projects with non-zero usage, largest first
    pub fn ranked(&self) -> Vec<&ProjectUsage> {
        rank(&self.projects)
    }

    pub fn total(&self) -> u64 {
        total_usage(&self.projects)
    }

    /// Every project, largest first (zero-usage ones last), plus the total
    pub fn to_json(&self) -> serde_json::Result<String> {
        let mut projects: Vec<&ProjectUsage> = self.projects.iter().collect();
        projects.sort_by_key(|u| Reverse(u.usage));

        serde_json::to_string_pretty(&ReportDocument {
            identity: &self.identity,
            registry: &self.registry,
            projects,
            total: self.total(),
        })
    }
}

/// Plain-text report lines, written as the run progresses
pub struct ReportWriter<W> {
    out: W,
}

impl<W: Write> ReportWriter<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    pub fn identity(&mut self, identity: &str) -> io::Result<()> {
        writeln!(self.out, "{}", identity)
    }

    /// `Fetching all <what>...`
    pub fn fetching(&mut self, what: &str) -> io::Result<()> {
        writeln!(self.out, "Fetching all {}...", what)
    }

    /// `\t<count> <what> found`
    pub fn found(&mut self, count: usize, what: &str) -> io::Result<()> {
        writeln!(self.out, "\t{} {} found", count, what)
    }

    pub fn processing(&mut self, project: &str) -> io::Result<()> {
        writeln!(self.out, "Processing {}...", project)
    }

    pub fn project(&mut self, usage: &ProjectUsage) -> io::Result<()> {
        writeln!(self.out, "\tUsage: {}", format_size(usage.usage))?;
        writeln!(self.out, "\tImages : {}", usage.image_count)
    }

    /// Ranked table followed by the grand total
    pub fn summary(&mut self, report: &Report) -> io::Result<()> {
        writeln!(self.out)?;
        writeln!(self.out, "Projects by usage:")?;
        for usage in report.ranked() {
            writeln!(self.out, "\t{}\t{}", format_size(usage.usage), usage.project)?;
        }
        writeln!(self.out)?;
        writeln!(self.out, "Total usage: {}", format_size(report.total()))
    }
}
