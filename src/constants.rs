pub mod domains {

    /// Hosts never chosen as a topic's primary source.
    pub const EXCLUDED: &[&str] = &[
        "youtube.com",
        "facebook.com",
        "instagram.com",
        "twitter.com",
        "tiktok.com",
        "reddit.com",
        "pinterest.com",
        "linkedin.com",
        "twitch.tv",
        "amazon.com",
        "ebay.com",
        "etsy.com",
        "walmart.com",
        "wikipedia.org",
        "quora.com",
    ];

    /// Music-trade publications, worth the most when ranking organic results.
    pub const PREMIUM: &[&str] = &[
        "musictech.com",
        "musicradar.com",
        "soundonsound.com",
        "attackmagazine.com",
        "residentadvisor.net",
        "billboard.com",
        "musicbusinessworldwide.com",
        "gearspace.com",
        "kvraudio.com",
        "pitchfork.com",
        "rollingstone.com",
        "mixmag.net",
        "djmag.com",
        "synthtopia.com",
        "musicweek.com",
    ];

    pub const INDUSTRY: &[&str] = &[
        "techcrunch.com",
        "theverge.com",
        "wired.com",
        "engadget.com",
        "arstechnica.com",
        "venturebeat.com",
        "digitalmusicnews.com",
        "hypebot.com",
        "musically.com",
        "cdm.link",
        "splice.com",
        "native-instruments.com",
    ];
}

pub mod scoring {

    pub const MIN_SCORE: i32 = 40;

    /// Added to every successful organic search.
    pub const RECENCY_BONUS: i32 = 25;

    pub const MAX_BASE_SCORE: i32 = 95;

    pub const MAX_SCORE: i32 = 100;

    /// Quality assigned to the unfiltered first result when every hit was excluded.
    pub const UNFILTERED_QUALITY: i32 = 5;
}

pub mod limits {

    pub const MAX_QUERY_CHARS: usize = 100;

    pub const MAX_PAA_QUESTIONS: usize = 5;

    pub const MIN_QUESTIONS: usize = 3;

    pub const MAX_REPORT_QUESTIONS: usize = 7;

    pub const MAX_AI_MODE_INSIGHTS: usize = 3;

    pub const MAX_AI_SURFACE_QUESTIONS: usize = 5;

    pub const AI_OVERVIEW_CHARS: usize = 200;

    pub const NARRATIVE_SLOTS: usize = 4;

    pub const DISCORD_MESSAGE_CHARS: usize = 2000;

    pub const DISCORD_CHUNK_CHARS: usize = 1900;
}

pub mod intervals {
    use std::time::Duration;

    pub const DISCORD_CHUNK: Duration = Duration::from_secs(1);
}
