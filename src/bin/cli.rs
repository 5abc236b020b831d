//! monolink CLI
//!
//! Local entry point for inspecting the content and engagement backends.
//! For the revalidation webhook, use `monolink-server`.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use monolink::{
    config::load_config,
    error::Result,
    models::{Article, Config, FormatSize, NewComment},
    query::{ArticleQuery, SortKey},
    services::{ContentClient, DEFAULT_FEATURED_LIMIT, EngagementClient, FailurePolicy},
    storage::RestStore,
    utils::{
        cdn::{CdnUrlBuilder, Crop, ImageFormat, Quality, Transform},
        http,
        text::{extract_excerpt, is_valid_slug, reading_time_minutes, slugify},
        url::normalize_optional,
    },
};

/// Excerpt length shown in article details.
const EXCERPT_LEN: usize = 160;

/// monolink - blog data layer tools
#[derive(Parser, Debug)]
#[command(name = "monolink", version, about = "Blog content and engagement tools")]
struct Cli {
    /// Path to the config file
    #[arg(short, long, default_value = "config.toml")]
    config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Report backend failures instead of masking them
    #[arg(long)]
    strict: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Validate configuration
    Validate,

    /// List articles
    Articles {
        #[arg(long, default_value_t = 1)]
        page: u32,

        #[arg(long, default_value_t = 25)]
        page_size: u32,

        /// Only articles in this category
        #[arg(long)]
        category: Option<String>,
    },

    /// Show the newest articles
    Featured {
        #[arg(long, default_value_t = DEFAULT_FEATURED_LIMIT)]
        limit: u32,
    },

    /// Show one article by slug (or id with --id)
    Article {
        slug: String,

        /// Treat the argument as an article id
        #[arg(long)]
        id: bool,
    },

    /// List article slugs for page pre-generation
    Slugs {
        #[arg(long, default_value_t = 100)]
        limit: u32,
    },

    /// Search article titles, descriptions and bodies
    Search { query: String },

    /// List categories, or show one by slug
    Categories { slug: Option<String> },

    /// List authors, or show one by id
    Authors { id: Option<String> },

    /// List comments on an article
    Comments { slug: String },

    /// Post a comment
    Comment {
        slug: String,

        #[arg(long)]
        name: String,

        #[arg(long)]
        email: Option<String>,

        content: String,
    },

    /// Like an article
    Like {
        slug: String,

        #[arg(long)]
        user: Option<String>,
    },

    /// Show likes and views for an article
    Stats { slug: String },

    /// Record a view of an article
    View { slug: String },

    /// Build a CDN delivery URL
    CdnUrl {
        public_id: String,

        #[arg(long)]
        width: Option<u32>,

        #[arg(long)]
        height: Option<u32>,

        /// `auto` or 1-100
        #[arg(long)]
        quality: Option<Quality>,

        #[arg(long)]
        format: Option<ImageFormat>,

        #[arg(long)]
        crop: Option<Crop>,
    },
}

/// Initialize logging based on verbosity flag.
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

fn content_client(config: &Config) -> Result<ContentClient> {
    let client = http::create_async_client(&config.http)?;
    Ok(ContentClient::new(client, &config.content))
}

fn engagement_client(config: &Config, policy: FailurePolicy) -> Result<EngagementClient<RestStore>> {
    let client = http::create_async_client(&config.http)?;
    let store = RestStore::new(client, &config.engagement);
    Ok(EngagementClient::with_policy(store, policy))
}

fn print_article_line(article: &Article) {
    let published = article
        .published_at
        .map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| "draft".to_string());
    println!("{:>6}  {}  {}  ({})", article.id, published, article.title, article.slug);
}

fn print_article(article: &Article) {
    println!("{}", article.title);
    println!("  slug:      {}", article.slug);
    if let Some(author) = &article.author {
        println!("  author:    {}", author.name);
    }
    if let Some(category) = &article.category {
        println!("  category:  {}", category.name);
    }
    if let Some(cover) = &article.cover {
        let url = cover.url_for(FormatSize::Medium);
        let origin = if CdnUrlBuilder::is_cdn_url(url) { "cdn" } else { "content" };
        println!("  cover:     {url} ({origin})");
    }
    println!("  reading:   {} min", reading_time_minutes(&article.content));
    let summary = if article.description.trim().is_empty() {
        extract_excerpt(&article.content, EXCERPT_LEN)
    } else {
        article.description.clone()
    };
    println!();
    println!("{summary}");
}

/// Main entry point for the CLI application.
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = load_config(Some(&cli.config))?;
    let policy = if cli.strict {
        FailurePolicy::Propagate
    } else {
        FailurePolicy::Mask
    };

    match cli.command {
        Command::Validate => {
            log::info!("Configuration is valid");
            println!("content:     {}", config.content.base_url);
            println!("engagement:  {}", config.engagement.url);
            println!("cdn:         {}", CdnUrlBuilder::new(&config.cdn.cloud_name).base_url());
            println!(
                "revalidate:  {} (secret {})",
                config.revalidation.bind_addr,
                if config.revalidation.secret.is_empty() {
                    "missing"
                } else {
                    "set"
                }
            );
        }

        Command::Articles {
            page,
            page_size,
            category,
        } => {
            let content = content_client(&config)?;
            let articles = match category {
                Some(slug) => content.get_articles_by_category(&slug).await?,
                None => {
                    let query = ArticleQuery::new()
                        .populate(["cover", "author", "category"])
                        .sort(SortKey::desc("publishedAt"))
                        .page(page)
                        .page_size(page_size);
                    let resp = content.list_articles(&query).await?;
                    if let Some(p) = resp.meta.pagination {
                        log::info!(
                            "Page {}/{} ({} articles total)",
                            p.page,
                            p.page_count,
                            p.total
                        );
                    }
                    resp.data
                }
            };
            articles.iter().for_each(print_article_line);
        }

        Command::Featured { limit } => {
            let content = content_client(&config)?;
            content
                .get_featured_articles(limit)
                .await?
                .iter()
                .for_each(print_article_line);
        }

        Command::Article { slug, id } => {
            let content = content_client(&config)?;
            let article = if id {
                content.get_article_by_id(&slug).await?
            } else {
                let slug = if is_valid_slug(&slug) {
                    slug.clone()
                } else {
                    let normalized = slugify(&slug);
                    log::debug!("Using slug '{normalized}' for '{slug}'");
                    normalized
                };
                content.get_article_by_slug(&slug).await?
            };
            match article {
                Some(article) => print_article(&article),
                None => log::warn!("No article found for '{slug}'"),
            }
        }

        Command::Slugs { limit } => {
            let content = content_client(&config)?;
            for slug in content.list_article_slugs(limit).await? {
                println!("{slug}");
            }
        }

        Command::Search { query } => {
            let content = content_client(&config)?.with_search_policy(policy);
            let results = content.search_articles(&query).await?;
            log::info!("{} result(s) for '{}'", results.len(), query);
            results.iter().for_each(print_article_line);
        }

        Command::Categories { slug } => {
            let content = content_client(&config)?;
            match slug {
                Some(slug) => match content.get_category_by_slug(&slug).await? {
                    Some(category) => println!("{}", serde_json::to_string_pretty(&category)?),
                    None => log::warn!("No category found for '{slug}'"),
                },
                None => {
                    for category in content.list_categories().await?.data {
                        println!("{:>6}  {}  ({})", category.id, category.name, category.slug);
                    }
                }
            }
        }

        Command::Authors { id } => {
            let content = content_client(&config)?;
            match id {
                Some(id) => match content.get_author_by_id(&id).await? {
                    Some(author) => println!("{}", serde_json::to_string_pretty(&author)?),
                    None => log::warn!("No author found for id {id}"),
                },
                None => {
                    for author in content.list_authors().await?.data {
                        let avatar = normalize_optional(
                            content.base_url(),
                            author.avatar.as_ref().map(|a| a.url.as_str()),
                        )
                        .unwrap_or_else(|| "-".to_string());
                        println!("{:>6}  {}  {}", author.id, author.name, avatar);
                    }
                }
            }
        }

        Command::Comments { slug } => {
            let engagement = engagement_client(&config, policy)?;
            for comment in engagement.list_comments(&slug).await? {
                println!(
                    "[{}] {}: {}",
                    comment.created_at.format("%Y-%m-%d %H:%M"),
                    comment.author_name,
                    comment.content
                );
            }
        }

        Command::Comment {
            slug,
            name,
            email,
            content,
        } => {
            let engagement = engagement_client(&config, policy)?;
            let comment = NewComment::new(slug, name, email, content);
            match engagement.add_comment(comment).await? {
                Some(saved) => log::info!("Comment {} posted", saved.id),
                None => log::warn!("Comment was not posted"),
            }
        }

        Command::Like { slug, user } => {
            let engagement = engagement_client(&config, policy)?;
            if engagement.add_like(&slug, user.as_deref(), None).await? {
                log::info!("Liked '{slug}'");
            } else {
                log::warn!("Like was not recorded");
            }
        }

        Command::Stats { slug } => {
            let engagement = engagement_client(&config, policy)?;
            let (likes, views) = tokio::join!(
                engagement.count_likes(&slug),
                engagement.get_view_count(&slug)
            );
            println!("{slug}: {} like(s), {} view(s)", likes?, views?);
        }

        Command::View { slug } => {
            let engagement = engagement_client(&config, policy)?;
            let views = engagement.increment_view_count(&slug).await?;
            println!("{slug}: {views} view(s)");
        }

        Command::CdnUrl {
            public_id,
            width,
            height,
            quality,
            format,
            crop,
        } => {
            let transform = Transform {
                width,
                height,
                quality,
                format,
                crop,
            };
            let cdn = CdnUrlBuilder::new(&config.cdn.cloud_name);
            println!("{}", cdn.url(&public_id, &transform));
        }
    }

    Ok(())
}
