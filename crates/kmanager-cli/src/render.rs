//! Plain-text tables and reader views for `--format table`.

use chrono::{DateTime, Utc};
use kmanager_api_client::IngestionOutcome;
use kmanager_core::models::{
    ContentDetail, ContentGridItem, DocumentGridItem, ProcessedContent, ProcessedDocument,
    SearchResponse, TutorialContent, TutorialDetail, TutorialListItem,
};

use crate::truncate_string;

fn format_date(date: Option<&DateTime<Utc>>) -> String {
    date.map(|d| d.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| "-".to_string())
}

fn print_footer(shown: usize, total: u64, has_more: bool) {
    println!("\nShowing {} of {}", shown, total);
    if has_more {
        println!("... (more items available, use --pages or --all to load more)");
    }
    println!();
}

pub fn print_content_grid(items: &[ContentGridItem], total: u64, has_more: bool) {
    println!("\n=== Content ===\n");

    if items.is_empty() {
        println!("No content found.\n");
        return;
    }

    println!(
        "{:<24} {:<18} {:<11} {:<40} {:<20} {:>16}",
        "ID", "Collection", "Type", "Title", "Author", "Processed"
    );
    println!("{}", "-".repeat(134));

    for item in items {
        println!(
            "{:<24} {:<18} {:<11} {:<40} {:<20} {:>16}",
            truncate_string(&item.id, 24),
            truncate_string(&item.collection, 18),
            item.content_type.display_name(),
            truncate_string(&item.title, 40),
            truncate_string(&item.author, 20),
            format_date(item.processed_date.as_ref()),
        );
    }

    print_footer(items.len(), total, has_more);
}

pub fn print_document_grid(items: &[DocumentGridItem], total: u64, has_more: bool) {
    println!("\n=== Documents ===\n");

    if items.is_empty() {
        println!("No documents found.\n");
        return;
    }

    println!(
        "{:<36} {:<40} {:<5} {:<30} {:>16}",
        "ID", "Title", "Type", "Tags", "Created"
    );
    println!("{}", "-".repeat(131));

    for item in items {
        println!(
            "{:<36} {:<40} {:<5} {:<30} {:>16}",
            truncate_string(&item.id, 36),
            truncate_string(&item.title, 40),
            item.file_type,
            truncate_string(&item.tags.join(", "), 30),
            format_date(Some(&item.created_date)),
        );
    }

    print_footer(items.len(), total, has_more);
}

pub fn print_tutorial_list(items: &[TutorialListItem], total: u64, has_more: bool) {
    println!("\n=== Tutorials ===\n");

    if items.is_empty() {
        println!("No tutorials found.\n");
        return;
    }

    println!(
        "{:<36} {:<40} {:<11} {:>8} {:<12} {:>16}",
        "ID", "Title", "Source", "Sections", "Level", "Generated"
    );
    println!("{}", "-".repeat(128));

    for item in items {
        println!(
            "{:<36} {:<40} {:<11} {:>8} {:<12} {:>16}",
            truncate_string(&item.id, 36),
            truncate_string(&item.title, 40),
            item.source_type.display_name(),
            item.section_count,
            item.metadata.difficulty_level.as_deref().unwrap_or("-"),
            format_date(Some(&item.generated_date)),
        );
    }

    print_footer(items.len(), total, has_more);
}

pub fn print_search_results(response: &SearchResponse) {
    println!("\n=== Results for \"{}\" ===\n", response.query);

    if response.results.is_empty() {
        println!("No matches.\n");
        return;
    }

    println!("{:>6}  {:<40} {:<60}", "Score", "Title", "Excerpt");
    println!("{}", "-".repeat(108));

    for result in &response.results {
        let score = result
            .distance
            .map(|d| format!("{:.3}", d))
            .unwrap_or_else(|| "-".to_string());
        let excerpt = result.content.replace('\n', " ");
        println!(
            "{:>6}  {:<40} {:<60}",
            score,
            truncate_string(result.title(), 40),
            truncate_string(&excerpt, 60),
        );
    }
    println!();
}

pub fn print_content(content: &ProcessedContent) {
    let meta = &content.metadata;
    println!("\n=== {} ===\n", meta.title);
    println!("Type:      {}", meta.content_type.display_name());
    println!("Author:    {}", meta.author);
    println!("Source:    {}", meta.source_url);
    if let Some(id) = &meta.id {
        println!("ID:        {}", id);
    }
    if let Some(duration) = &meta.duration {
        println!("Duration:  {}", duration);
    }
    println!("Processed: {}", format_date(meta.processed_date.as_ref()));

    if let Some(summary) = &meta.summary {
        println!("\n{}", summary);
    }

    for section in &content.sections {
        println!("\n--- {} ---\n{}", section.title, section.content);
    }
    println!();
}

pub fn print_content_detail(detail: &ContentDetail) {
    println!("\n=== {} ===\n", detail.title);
    println!("ID:        {}", detail.id);
    println!("Type:      {}", detail.content_type.display_name());
    println!("Author:    {}", detail.author);
    println!("Source:    {}", detail.source_url);
    println!("Processed: {}", format_date(Some(&detail.processed_date)));
    if let Some(tutorial_id) = &detail.tutorial_id {
        println!("Tutorial:  {}", tutorial_id);
    }
    if let Some(summary) = &detail.summary {
        println!("\n{}", summary);
    }
    for (i, chunk) in detail.content_chunks.iter().enumerate() {
        println!("\n--- Section {} ---\n{}", i + 1, chunk);
    }
    println!();
}

pub fn print_document(document: &ProcessedDocument) {
    let meta = &document.metadata;
    println!("\n=== {} ===\n", meta.title);
    println!("ID:       {}", document.document_id);
    if let Some(file_type) = &meta.file_type {
        println!("Type:     {}", file_type);
    }
    if let Some(size) = meta.file_size {
        println!("Size:     {:.2} KB", size as f64 / 1024.0);
    }
    if !meta.tags.is_empty() {
        println!("Tags:     {}", meta.tags.join(", "));
    }
    println!("Uploaded: {}", format_date(meta.upload_date.as_ref()));
    println!("\n{}\n", document.content);
}

pub fn print_tutorial(tutorial: &TutorialContent) {
    println!("\n=== Tutorial ===\n");

    for paragraph in &tutorial.summary {
        println!("{}\n", paragraph);
    }

    if !tutorial.key_points.is_empty() {
        println!("Key points:");
        for point in &tutorial.key_points {
            println!("  - {}", point);
        }
        println!();
    }

    for (i, example) in tutorial.code_examples.iter().enumerate() {
        let language = example.language.as_deref().unwrap_or("text");
        println!("Example {} ({}): {}", i + 1, language, example.explanation);
        println!("{}\n", example.code);
    }

    for (i, exercise) in tutorial.practice_exercises.iter().enumerate() {
        println!("Exercise {}: {}", i + 1, exercise.question);
        if let Some(hints) = &exercise.hints {
            for hint in hints {
                println!("  hint: {}", hint);
            }
        }
        println!("  solution: {}\n", exercise.solution);
    }

    if let Some(notes) = &tutorial.additional_notes {
        println!("Notes:");
        for note in notes {
            println!("  - {}", note);
        }
        println!();
    }
}

pub fn print_tutorial_detail(detail: &TutorialDetail) {
    println!("\n=== {} ===\n", detail.title);
    println!("ID:        {}", detail.id);
    println!("Source:    {}", detail.source_type.display_name());
    if let Some(url) = &detail.source_url {
        println!("URL:       {}", url);
    }
    if let Some(level) = &detail.metadata.difficulty_level {
        println!("Level:     {}", level);
    }
    if let Some(time) = &detail.metadata.estimated_time {
        println!("Time:      {}", time);
    }
    if !detail.metadata.prerequisites.is_empty() {
        println!("Requires:  {}", detail.metadata.prerequisites.join(", "));
    }
    println!("Generated: {}", format_date(Some(&detail.generated_date)));
    if !detail.description.is_empty() {
        println!("\n{}", detail.description);
    }

    for section in detail.ordered_sections() {
        println!("\n--- {} [{}] ---\n{}", section.title, section.section_type, section.content);
    }
    println!();
}

pub fn print_ingestion(outcome: &IngestionOutcome) {
    print_content(&outcome.content);

    match (&outcome.tutorial, &outcome.tutorial_error) {
        (Some(tutorial), _) => print_tutorial(tutorial),
        (None, Some(error)) => {
            println!("Tutorial generation failed: {}", error);
            if outcome.can_generate_tutorial {
                println!(
                    "Retry with: kmanager tutorial generate {} --type {}\n",
                    outcome.content_id, outcome.content.metadata.content_type
                );
            }
        }
        (None, None) => {}
    }
}
