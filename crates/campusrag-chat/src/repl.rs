//! Interactive loop over a question/answer pipeline.
//!
//! Generic over the input/output streams so the loop is testable with
//! in-memory buffers; the binary hands it locked stdin/stdout.

use anyhow::Result;
use std::io::{BufRead, Write};

use campusrag_core::traits::{CompletionProvider, Retriever};
use campusrag_core::types::Completion;

use crate::pipeline::AnswerPipeline;

/// `exit` and `quit` end the session, in any letter case.
pub fn is_exit_command(input: &str) -> bool {
    input.eq_ignore_ascii_case("exit") || input.eq_ignore_ascii_case("quit")
}

/// Read questions one line at a time until EOF or an exit command.
///
/// Every question runs the pipeline end to end. A failure answering one
/// question is reported and the loop keeps accepting input; only the
/// operator ends the session.
pub async fn run_chat_loop<R, C, In, Out>(
    pipeline: &AnswerPipeline<R, C>,
    input: In,
    output: &mut Out,
) -> Result<()>
where
    R: Retriever,
    C: CompletionProvider,
    In: BufRead,
    Out: Write,
{
    let mut lines = input.lines();
    loop {
        write!(output, "> ")?;
        output.flush()?;

        let Some(line) = lines.next() else { break };
        let line = line?;
        let question = line.trim();
        if question.is_empty() {
            continue;
        }
        if is_exit_command(question) {
            writeln!(output, "👋 Goodbye!")?;
            break;
        }

        match pipeline.answer(question).await {
            Ok(Completion::Text(answer)) => {
                writeln!(output, "\n{answer}\n")?;
            }
            Ok(Completion::Degraded(raw)) => {
                writeln!(output, "\n⚠️ The completion service returned no answer text. Raw response:")?;
                writeln!(output, "{raw}\n")?;
            }
            Err(e) => {
                writeln!(output, "\n❌ An error occurred during processing: {e}\n")?;
            }
        }
    }
    Ok(())
}
