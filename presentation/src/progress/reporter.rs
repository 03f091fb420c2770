//! Progress reporting for consultation runs

use colored::Colorize;
use consilium_application::DiscussionObserver;
use consilium_domain::{Agent, FinalSummary, FinishReason, Phase, SummaryStatus, TallyOutcome, VoteRecord};
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use std::io::Write;
use std::sync::Mutex;
use std::time::Duration;

/// Reports progress during a consultation with progress bars
pub struct ProgressReporter {
    multi: MultiProgress,
    round_bar: Mutex<Option<ProgressBar>>,
    vote_bar: Mutex<Option<ProgressBar>>,
}

impl ProgressReporter {
    pub fn new() -> Self {
        Self {
            multi: MultiProgress::new(),
            round_bar: Mutex::new(None),
            vote_bar: Mutex::new(None),
        }
    }

    fn round_style() -> ProgressStyle {
        ProgressStyle::default_bar()
            .template("{spinner:.green} {prefix:.bold.cyan} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=>-")
    }

    fn spinner_style() -> ProgressStyle {
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {prefix:.bold} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
    }

    fn println(&self, line: String) {
        if self.multi.println(&line).is_err() {
            println!("{}", line);
        }
    }

    fn finish_vote_bar(&self, message: String) {
        if let Ok(mut slot) = self.vote_bar.lock()
            && let Some(pb) = slot.take()
        {
            pb.finish_with_message(message);
        }
    }
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl DiscussionObserver for ProgressReporter {
    fn on_round_start(&self, round: u32, queue: &[String]) {
        let pb = self.multi.add(ProgressBar::new(queue.len() as u64));
        pb.set_style(Self::round_style());
        pb.set_prefix(format!("Round {}", round));
        pb.set_message("Starting...");
        pb.enable_steady_tick(Duration::from_millis(120));

        if let Ok(mut slot) = self.round_bar.lock()
            && let Some(old) = slot.replace(pb)
        {
            old.finish_and_clear();
        }
    }

    fn on_phase_change(&self, phase: Phase) {
        if phase != Phase::Voting {
            return;
        }
        if let Ok(mut slot) = self.round_bar.lock()
            && let Some(pb) = slot.take()
        {
            pb.finish_with_message(format!("{}", "discussion complete".green()));
        }

        let spinner = self.multi.add(ProgressBar::new_spinner());
        spinner.set_style(Self::spinner_style());
        spinner.set_prefix("Voting");
        spinner.set_message("collecting votes...");
        spinner.enable_steady_tick(Duration::from_millis(120));
        if let Ok(mut slot) = self.vote_bar.lock() {
            *slot = Some(spinner);
        }
    }

    fn on_turn_start(&self, agent: &Agent, _index: usize, _total: usize) {
        if let Ok(slot) = self.round_bar.lock()
            && let Some(pb) = slot.as_ref()
        {
            pb.set_message(format!("{} is speaking...", agent.name));
        }
    }

    fn on_turn_complete(&self, agent: &Agent, success: bool) {
        if let Ok(slot) = self.round_bar.lock()
            && let Some(pb) = slot.as_ref()
        {
            let status = if success {
                format!("{} {}", "v".green(), agent.name)
            } else {
                format!("{} {}", "x".red(), agent.name)
            };
            pb.set_message(status);
            pb.inc(1);
        }
    }

    fn on_vote(&self, vote: &VoteRecord) {
        if let Ok(slot) = self.vote_bar.lock()
            && let Some(pb) = slot.as_ref()
        {
            pb.set_message(format!("{} voted", vote.voter_name));
        }
    }

    fn on_tally(&self, outcome: &TallyOutcome) {
        let message = match outcome {
            TallyOutcome::Eliminated { agent_name, votes, .. } => {
                format!("{} eliminated ({} votes)", agent_name.red(), votes)
            }
            TallyOutcome::NoElimination { .. } => format!("{}", "no elimination".yellow()),
        };
        self.finish_vote_bar(message);
    }

    fn on_pause_changed(&self, paused: bool) {
        if paused {
            self.println(format!("{}", "|| Paused. Type 'resume' to continue.".yellow()));
        } else {
            self.println(format!("{}", "> Resumed.".green()));
        }
    }

    fn on_finished(&self, reason: &FinishReason) {
        self.println(format!("{} {}", "Finished:".cyan().bold(), reason.message()));
    }

    fn on_summary(&self, summary: &FinalSummary) {
        if summary.status == SummaryStatus::Pending {
            self.println(format!(
                "{} {} is writing the final summary...",
                "->".cyan(),
                summary.agent_name
            ));
        }
    }
}

/// Simple text-based progress that streams replies as they are revealed
pub struct SimpleProgress;

impl DiscussionObserver for SimpleProgress {
    fn on_round_start(&self, round: u32, queue: &[String]) {
        println!(
            "{} {} ({} speakers)",
            "->".cyan(),
            format!("Round {}", round).bold(),
            queue.len()
        );
    }

    fn on_phase_change(&self, phase: Phase) {
        if phase == Phase::Voting {
            println!("{} {}", "->".cyan(), "Voting".bold());
        }
    }

    fn on_turn_start(&self, agent: &Agent, index: usize, total: usize) {
        println!("\n{} [{}/{}]", format!("── {} ──", agent.name).yellow().bold(), index + 1, total);
    }

    fn on_reveal_chunk(&self, _agent: &Agent, chunk: &str) {
        print!("{}", chunk);
        let _ = std::io::stdout().flush();
    }

    fn on_turn_complete(&self, agent: &Agent, success: bool) {
        if success {
            println!();
        } else {
            println!("  {} {} (failed)", "x".red(), agent.name);
        }
    }

    fn on_vote(&self, vote: &VoteRecord) {
        println!("  {} -> {}: {}", vote.voter_name, vote.target_name.bold(), vote.reason);
    }

    fn on_tally(&self, outcome: &TallyOutcome) {
        println!("{}", outcome.message().green());
    }

    fn on_pause_changed(&self, paused: bool) {
        println!("{}", if paused { "|| Paused" } else { "> Resumed" });
    }

    fn on_finished(&self, reason: &FinishReason) {
        println!("\n{}", reason.message().cyan().bold());
    }
}
