use anyhow::Result;
use clap::Parser;

use redsearch_client::{clean_cookie, hint, SearchSession};
use redsearch_common::{RowRecord, SearchRequest};

/// Search through the workflow proxy and print the normalized results.
#[derive(Parser)]
#[command(name = "redsearch", about = "AI 智能搜索命令行客户端")]
struct Args {
    /// Search keywords
    keywords: String,

    /// Auth cookie; falls back to the XHS_COOKIE environment variable
    #[arg(long)]
    cookie: Option<String>,

    /// Base URL of the search proxy
    #[arg(long, default_value = "http://127.0.0.1:3000")]
    server: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let cookie = match args.cookie.or_else(|| std::env::var("XHS_COOKIE").ok()) {
        Some(cookie) => cookie,
        None => anyhow::bail!("缺少 Cookie：使用 --cookie 或设置 XHS_COOKIE 环境变量"),
    };

    let (cookie, removed) = clean_cookie(&cookie);
    if removed > 0 {
        eprintln!("⚠️ 已清理 {removed} 个非 ASCII 字符");
    }

    let mut session = SearchSession::new(&args.server);
    session
        .search(&SearchRequest {
            keywords: args.keywords,
            cookie,
        })
        .await;

    if let Some(failure) = session.error() {
        eprintln!("搜索失败: {}", failure.message);
        if let Some(hint) = hint::hint_for(failure.kind) {
            eprintln!("💡 {hint}");
        }
        std::process::exit(1);
    }

    let rows = session.rows();
    if rows.is_empty() {
        println!("没有找到搜索结果");
        return Ok(());
    }

    println!("搜索结果 ({} 条)", rows.len());
    println!();
    for (index, row) in rows.iter().enumerate() {
        print_row(index + 1, row);
    }

    Ok(())
}

fn print_row(ordinal: usize, row: &RowRecord) {
    println!("{ordinal:>3}. {}", row.title);
    println!("     {}", row.content);
    if let Some(author) = &row.author {
        match &row.platform {
            Some(platform) => println!("     {author} @ {platform}"),
            None => println!("     {author}"),
        }
    }
    if let Some(score) = row.score {
        if score > 0.0 {
            println!("     ❤️ {score}");
        }
    }
    if let Some(url) = &row.url {
        println!("     {url}");
    }
    println!();
}
