use std::io::{self, Write};

use serde::Serialize;

use crate::app::{AppContext, Result};
use crate::domain::{Chapter, HomePage, NovelDetail, NovelSummary, UpdatedAt};

pub async fn latest(ctx: &AppContext, json: bool) -> Result<()> {
    let latest = ctx.library.latest_updates().await?;
    let mut out = io::stdout().lock();
    if json {
        return write_json(&mut out, &latest);
    }
    if latest.is_empty() {
        writeln!(out, "No recent updates")?;
        return Ok(());
    }
    write_latest(&mut out, &latest)?;
    Ok(())
}

pub async fn home(ctx: &AppContext, json: bool) -> Result<()> {
    let home = ctx.library.home().await?;
    let mut out = io::stdout().lock();
    if json {
        return write_json(&mut out, &home);
    }
    write_home(&mut out, &home)?;
    Ok(())
}

pub async fn novel(ctx: &AppContext, url: &str, json: bool) -> Result<()> {
    let id = ctx.library.novel_id(url)?;
    let detail = ctx.library.novel(&id).await?;
    let mut out = io::stdout().lock();
    if json {
        return write_json(&mut out, detail.as_ref());
    }
    write_novel(&mut out, &detail)?;
    Ok(())
}

pub async fn chapter(ctx: &AppContext, url: &str, json: bool) -> Result<()> {
    let id = ctx.library.chapter_id(url)?;
    let chapter = ctx.library.chapter(&id).await?;
    let mut out = io::stdout().lock();
    if json {
        return write_json(&mut out, chapter.as_ref());
    }
    write_chapter(&mut out, &chapter)?;
    Ok(())
}

fn write_json<W: Write, T: Serialize + ?Sized>(out: &mut W, value: &T) -> Result<()> {
    serde_json::to_writer_pretty(&mut *out, value)?;
    writeln!(out)?;
    Ok(())
}

fn format_date(date: &UpdatedAt) -> String {
    match date {
        UpdatedAt::Date(d) => d.format("%Y-%m-%d").to_string(),
        UpdatedAt::Raw(s) => s.clone(),
    }
}

fn write_latest<W: Write>(out: &mut W, latest: &[NovelSummary]) -> io::Result<()> {
    for novel in latest {
        let chapter = novel
            .latest_chapter
            .as_ref()
            .map(|c| c.title.as_str())
            .unwrap_or("-");
        let date = novel.updated_at.as_ref().map(format_date).unwrap_or_default();
        writeln!(out, "{:<40} {:<30} {}", novel.title, chapter, date)?;
        if let Some(author) = &novel.author {
            writeln!(out, "    by {}", author)?;
        }
        writeln!(out, "    {}", novel.id)?;
    }
    Ok(())
}

fn write_home<W: Write>(out: &mut W, home: &HomePage) -> io::Result<()> {
    if !home.featured.is_empty() {
        writeln!(out, "Featured")?;
        for novel in &home.featured {
            writeln!(out, "  {}  {}", novel.title, novel.id)?;
        }
        writeln!(out)?;
    }
    writeln!(out, "Latest updates")?;
    write_latest(out, &home.latest)
}

fn write_novel<W: Write>(out: &mut W, detail: &NovelDetail) -> io::Result<()> {
    writeln!(out, "{}", detail.title)?;
    if let Some(author) = &detail.author {
        writeln!(out, "Author: {}", author)?;
    }
    if let Some(cover) = &detail.cover_url {
        writeln!(out, "Cover: {}", cover)?;
    }
    if !detail.description.is_empty() {
        writeln!(out, "\n{}", detail.description)?;
    }
    writeln!(out, "\n{} chapters", detail.chapters.len())?;
    for (i, chapter) in detail.chapters.iter().enumerate() {
        writeln!(out, "{:>5}. {}  {}", i + 1, chapter.title, chapter.url)?;
    }
    Ok(())
}

fn write_chapter<W: Write>(out: &mut W, chapter: &Chapter) -> io::Result<()> {
    writeln!(out, "{}\n", chapter.display_title())?;
    for paragraph in &chapter.paragraphs {
        writeln!(out, "{}\n", paragraph)?;
    }
    if let Some(prev) = &chapter.prev_url {
        writeln!(out, "Previous: {}", prev)?;
    }
    if let Some(next) = &chapter.next_url {
        writeln!(out, "Next: {}", next)?;
    }
    Ok(())
}
