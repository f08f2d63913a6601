// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fetch command

#[derive(clap::Args)]
pub struct FetchArgs {
    /// Page URL
    url: String,

    /// CSS selector; prints the text of each match
    #[arg(long, default_value = "body")]
    select: String,
}

pub async fn handle(args: FetchArgs) -> anyhow::Result<()> {
    let texts = tokio::task::spawn_blocking(move || {
        let doc = hoard_fetch::fetch_dom(&args.url)?;
        hoard_fetch::select_text(&doc, &args.select)
    })
    .await??;

    for text in texts {
        println!("{}", text);
    }
    Ok(())
}
