//! Terminal commands for browsing the document collection.
//!
//! Every list command goes through the same loop as an interactive view:
//! edits land in a [`QueryStateManager`], the resulting [`FilterState`] is
//! handed to the [`DocumentListFetcher`], and the returned [`FetchState`] is
//! rendered. Output goes to stdout; logs go to stderr.

use std::io::Write;
use std::sync::Arc;

use anyhow::{bail, Result};
use tokio::io::{AsyncBufReadExt, BufReader};

use finlib_core::filter::{FilterKey, FilterState, Page};
use finlib_core::list_view::FetchState;
use finlib_core::models::{DocumentDetail, DocumentPage, Pagination};
use finlib_core::query_state::QueryStateManager;

use crate::client::DocumentClient;
use crate::config::Config;
use crate::fetcher::{DocumentListFetcher, RetryPolicy};

/// Filter edits given on the command line.
#[derive(Debug, Clone, Default)]
pub struct ListArgs {
    pub link: Option<String>,
    pub query: Option<String>,
    pub category: Option<String>,
    pub featured: Option<String>,
    pub page: Option<u32>,
}

/// Applies command-line edits in the order a user would make them: filters
/// first (each resets the page), then an explicit page.
pub fn apply_args(args: &ListArgs) -> Result<QueryStateManager> {
    let mut state = QueryStateManager::from_shareable(args.link.as_deref().unwrap_or_default());
    if let Some(query) = &args.query {
        state.set_filter(FilterKey::Query, query);
    }
    if let Some(category) = &args.category {
        state.set_filter(FilterKey::CategoryId, category);
    }
    if let Some(featured) = &args.featured {
        state.set_filter(FilterKey::IsFeatured, featured);
    }
    if let Some(page) = args.page {
        let Some(page) = Page::new(page) else {
            bail!("--page must be >= 1");
        };
        state.set_page(page);
    }
    Ok(state)
}

fn build(config: &Config) -> Result<(DocumentClient, DocumentListFetcher)> {
    let client = DocumentClient::new(&config.api)?;
    let fetcher = DocumentListFetcher::new(
        Arc::new(client.clone()),
        RetryPolicy::from_config(&config.api),
        config.api.page_size,
    );
    Ok((client, fetcher))
}

/// `finlib list`: one fetch, rendered.
pub async fn run_list(config: &Config, args: &ListArgs) -> Result<()> {
    let state = apply_args(args)?;
    let (_, fetcher) = build(config)?;

    let result = fetcher.fetch(state.state().clone()).await;
    let mut out = std::io::stdout().lock();
    print_link(&mut out, &state)?;
    render(&mut out, state.state(), &result)?;

    if result.error().is_some() {
        bail!("document list could not be loaded");
    }
    Ok(())
}

/// `finlib browse`: a line-oriented session over stdin.
pub async fn run_browse(config: &Config, link: Option<&str>) -> Result<()> {
    let mut state = QueryStateManager::from_shareable(link.unwrap_or_default());
    let (client, fetcher) = build(config)?;

    refresh(&fetcher, &state).await?;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("> ");
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        let line = line.trim();
        let (command, arg) = line
            .split_once(char::is_whitespace)
            .map(|(c, a)| (c, a.trim()))
            .unwrap_or((line, ""));

        match command {
            "" => continue,
            "quit" | "exit" | "q" => break,
            "help" | "?" => print_help(),
            "link" => println!("link: {}", display_link(&state)),
            "query" | "category" | "featured" => {
                let key: FilterKey = command.parse()?;
                state.set_filter(key, arg);
                refresh(&fetcher, &state).await?;
            }
            "page" => match arg.parse::<u32>().ok().and_then(Page::new) {
                Some(page) => {
                    state.set_page(page);
                    refresh(&fetcher, &state).await?;
                }
                None => println!("page must be a positive integer"),
            },
            "next" => {
                let has_next = fetcher
                    .state()
                    .displayed()
                    .map(|p| Pagination::new(u64::from(state.state().page.get()), p.total_pages))
                    .is_some_and(|p| p.has_next());
                if has_next {
                    state.next_page();
                    refresh(&fetcher, &state).await?;
                } else {
                    println!("already on the last page");
                }
            }
            "prev" => {
                if state.state().page.is_first() {
                    println!("already on the first page");
                } else {
                    state.prev_page();
                    refresh(&fetcher, &state).await?;
                }
            }
            "clear" => {
                state.clear();
                refresh(&fetcher, &state).await?;
            }
            "open" => match arg.parse::<i64>() {
                Ok(id) => match client.get_document(id).await {
                    Ok(doc) => print_detail(&mut std::io::stdout().lock(), &client, &doc)?,
                    Err(e) => println!("Error: {}", e),
                },
                Err(_) => println!("usage: open <id>"),
            },
            other => println!("unknown command '{}', type 'help'", other),
        }
    }
    Ok(())
}

async fn refresh(fetcher: &DocumentListFetcher, state: &QueryStateManager) -> Result<()> {
    let result = fetcher.fetch(state.state().clone()).await;
    let mut out = std::io::stdout().lock();
    print_link(&mut out, state)?;
    render(&mut out, state.state(), &result)
}

fn print_help() {
    println!("commands:");
    println!("  query <text>       search titles, content and summaries (empty clears)");
    println!("  category <id>      filter by category id (empty clears)");
    println!("  featured <true>    only featured documents (empty clears)");
    println!("  page <n> | next | prev");
    println!("  clear              drop every filter");
    println!("  open <id>          show a document");
    println!("  link               print the shareable link");
    println!("  quit");
}

fn display_link(state: &QueryStateManager) -> String {
    if state.link().is_empty() {
        "(none)".to_string()
    } else {
        format!("?{}", state.link())
    }
}

fn print_link(out: &mut impl Write, state: &QueryStateManager) -> Result<()> {
    writeln!(out, "link: {}", display_link(state))?;
    Ok(())
}

/// Renders a fetch result the way the list view shows it: the error (if
/// any) above whatever page is still displayed, "No results." for an empty
/// page, and pagination controls when there is more than one page.
pub fn render(out: &mut impl Write, filter: &FilterState, state: &FetchState) -> Result<()> {
    if let Some(error) = state.error() {
        writeln!(out, "Error: failed to load documents ({})", error)?;
    }
    if state.is_loading() {
        writeln!(out, "Loading...")?;
    }

    let Some(page) = state.displayed() else {
        return Ok(());
    };
    if state.error().is_some() {
        writeln!(out, "(showing previous results)")?;
    }

    writeln!(out, "{} documents", page.total)?;
    if page.is_empty() {
        writeln!(out, "No results.")?;
        writeln!(out, "Try a different query or filter.")?;
        return Ok(());
    }
    writeln!(out)?;
    render_documents(out, page)?;

    let pagination = Pagination::new(u64::from(filter.page.get()), page.total_pages);
    if pagination.is_visible() {
        render_pagination(out, &pagination)?;
    }
    Ok(())
}

fn render_documents(out: &mut impl Write, page: &DocumentPage) -> Result<()> {
    for doc in &page.documents {
        let category = doc.category_name.as_deref().unwrap_or("기타");
        let featured = if doc.is_featured { " ★" } else { "" };
        writeln!(out, "[{}] {}{}  (views: {})", category, doc.title, featured, doc.view_count)?;
        writeln!(out, "    {}", doc.excerpt().replace('\n', " ").trim())?;

        let mut meta = Vec::new();
        if let Some(author) = &doc.author {
            meta.push(format!("author: {}", author));
        }
        if let Some(date) = doc.publication_date {
            meta.push(format!("published: {}", date.format("%Y-%m-%d")));
        }
        meta.push(format!("id: {}", doc.id));
        writeln!(out, "    {}", meta.join("  "))?;
        writeln!(out)?;
    }
    Ok(())
}

fn render_pagination(out: &mut impl Write, pagination: &Pagination) -> Result<()> {
    let pages: Vec<String> = pagination
        .window()
        .map(|p| {
            if p == pagination.current {
                format!("[{}]", p)
            } else {
                p.to_string()
            }
        })
        .collect();
    writeln!(
        out,
        "{} {} {}   (page {} of {})",
        if pagination.has_prev() { "< prev" } else { "      " },
        pages.join(" "),
        if pagination.has_next() { "next >" } else { "" },
        pagination.current,
        pagination.total_pages
    )?;
    Ok(())
}

/// `finlib get <id>`.
pub async fn run_get(config: &Config, id: i64) -> Result<()> {
    let client = DocumentClient::new(&config.api)?;
    let doc = client.get_document(id).await?;
    print_detail(&mut std::io::stdout().lock(), &client, &doc)
}

fn print_detail(
    out: &mut impl Write,
    client: &DocumentClient,
    doc: &DocumentDetail,
) -> Result<()> {
    writeln!(out, "--- Document ---")?;
    writeln!(out, "id:           {}", doc.id)?;
    writeln!(out, "title:        {}", doc.title)?;
    writeln!(
        out,
        "category:     {}",
        doc.category_name.as_deref().unwrap_or("기타")
    )?;
    if let Some(author) = &doc.author {
        writeln!(out, "author:       {}", author)?;
    }
    if let Some(source) = &doc.source {
        writeln!(out, "source:       {}", source)?;
    }
    if let Some(date) = doc.publication_date {
        writeln!(out, "published:    {}", date.format("%Y-%m-%d"))?;
    }
    let tags = doc.tag_list();
    if !tags.is_empty() {
        writeln!(out, "tags:         {}", tags.join(", "))?;
    }
    writeln!(out, "views:        {}", doc.view_count)?;
    writeln!(out, "featured:     {}", doc.is_featured)?;
    if let Some(url) = doc
        .file_path
        .as_deref()
        .and_then(|p| client.pdf_download_url(p))
    {
        writeln!(out, "pdf:          {}", url)?;
    }
    if let Some(summary) = &doc.summary {
        writeln!(out)?;
        writeln!(out, "--- Summary ---")?;
        writeln!(out, "{}", summary)?;
    }
    writeln!(out)?;
    writeln!(out, "--- Content ---")?;
    writeln!(out, "{}", doc.content)?;
    Ok(())
}

/// `finlib categories`.
pub async fn run_categories(config: &Config) -> Result<()> {
    let client = DocumentClient::new(&config.api)?;
    let categories = client.list_categories().await?;
    if categories.is_empty() {
        println!("No categories.");
        return Ok(());
    }
    for category in categories {
        match &category.description {
            Some(description) => println!("{:>4}  {}  ({})", category.id, category.name, description),
            None => println!("{:>4}  {}", category.id, category.name),
        }
    }
    Ok(())
}

/// `finlib suggest <query>`.
pub async fn run_suggest(config: &Config, query: &str) -> Result<()> {
    let client = DocumentClient::new(&config.api)?;
    let titles = client.suggest_titles(query).await;
    if titles.is_empty() {
        println!("No suggestions.");
    }
    for title in titles {
        println!("{}", title);
    }
    Ok(())
}

/// `finlib link <input>`: canonicalizes a shareable representation.
pub fn run_link(input: &str) -> Result<()> {
    let state = QueryStateManager::from_shareable(input);
    println!("link: {}", display_link(&state));
    println!("state: {}", state.state());
    Ok(())
}
