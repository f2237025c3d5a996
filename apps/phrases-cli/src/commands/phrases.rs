use anyhow::{bail, Result};
use phrases_client::{Confirm, PhraseBook, PhraseScreen, View};
use std::io::{BufRead, Write};

/// Reads the answer to a confirmation prompt from a line-based input.
pub struct LineConfirm<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> LineConfirm<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }
}

fn is_yes(answer: &str) -> bool {
    matches!(
        answer.trim().to_lowercase().as_str(),
        "y" | "yes" | "s" | "si" | "sí"
    )
}

impl<R: BufRead, W: Write> Confirm for LineConfirm<R, W> {
    fn confirm(&mut self, prompt: &str) -> bool {
        if write!(self.output, "{prompt} [s/N] ").is_err() || self.output.flush().is_err() {
            return false;
        }
        let mut answer = String::new();
        match self.input.read_line(&mut answer) {
            Ok(_) => is_yes(&answer),
            Err(_) => false,
        }
    }
}

pub async fn add<W: Write>(book: &mut PhraseBook, text: &str, out: &mut W) -> Result<()> {
    let phrase = book.add(text).await?;
    writeln!(out, "{}", phrase.id)?;
    Ok(())
}

pub async fn list<W: Write>(screen: &mut PhraseScreen, out: &mut W) -> Result<()> {
    screen.load().await?;
    match screen.view() {
        View::Loading => {}
        View::Empty => writeln!(out, "No phrases yet.")?,
        View::Rows(rows) => {
            for row in rows {
                writeln!(out, "{}  {:<12}  {}", row.id, row.date_label, row.text)?;
            }
        }
    }
    Ok(())
}

pub async fn edit<W: Write>(
    screen: &mut PhraseScreen,
    id: &str,
    text: &str,
    out: &mut W,
) -> Result<()> {
    screen.load().await?;
    screen.start_edit(id);
    if screen.editing_id().is_none() {
        bail!("no phrase with id {id}");
    }
    screen.set_edit_text(text);
    screen.save_edit().await?;
    if screen.editing_id().is_some() {
        bail!("text must not be blank");
    }
    writeln!(out, "Updated {id}")?;
    Ok(())
}

pub async fn archive<C, W>(
    screen: &mut PhraseScreen,
    id: &str,
    confirm: &mut C,
    out: &mut W,
) -> Result<()>
where
    C: Confirm + ?Sized,
    W: Write,
{
    if screen.request_archive(id, confirm).await? {
        writeln!(out, "Archived {id}")?;
    } else {
        writeln!(out, "Cancelled")?;
    }
    Ok(())
}
