use super::{Post, PostStatus};

const AUTHOR: &str = "Anonymous Author";

const DECENTRALIZED_BLOGGING: &str = r"# Introduction to Decentralized Blogging

This is a sample post about decentralized blogging. It covers the basics of how decentralized platforms work and their benefits.

## How it works

Posts are published to a network of peers instead of a single host. Readers fetch content from whichever peer is closest.

## Why it matters

No single operator can take a post down or rewrite it after the fact.
";

const FUTURE_OF_WEB3: &str = r"# The Future of Web3

Web3 is the next evolution of the internet. This post explores the potential impact of Web3 technologies on various industries.

## Finance

Programmable money changes how settlement and custody work.

## Media

Creators can sell directly to their audience and keep ownership of their catalog.
";

const ZERO_KNOWLEDGE: &str = r"# Understanding Zero-Knowledge Proofs

Zero-knowledge proofs are a cryptographic method that allows one party to prove to another party that a statement is true without revealing any information beyond the validity of the statement itself.

## Properties

1. Completeness
2. Soundness
3. Zero-knowledge

## A toy example

```rust
fn verify(commitment: u64, challenge: u64, response: u64) -> bool {
    commitment.wrapping_mul(challenge) == response
}
```
";

const DECENTRALIZED_SYSTEMS: &str = r#"
# Understanding Decentralized Systems

## Introduction

Decentralized systems are becoming increasingly important in the modern digital landscape. This blog post will explore the key concepts and benefits of decentralization.

## What is Decentralization?

Decentralization refers to the distribution of power, control, and decision-making across a network of participants rather than concentrating it in a single entity or authority.

### Key Characteristics

1. Distributed control
2. Increased resilience
3. Enhanced privacy and security

## Benefits of Decentralized Systems

Decentralized systems offer several advantages over traditional centralized systems:

1. **Resilience**: No single point of failure
2. **Transparency**: Open and auditable processes
3. **Security**: Improved data protection through distribution

## Examples of Decentralized Technologies

Here are some popular examples of decentralized technologies:

```python
decentralized_tech = [
    "Blockchain",
    "Distributed Ledger Technology (DLT)",
    "Peer-to-Peer (P2P) Networks",
    "Decentralized File Storage (e.g., IPFS)"
]
```

## Challenges and Future Outlook

While decentralized systems offer many benefits, they also face challenges such as scalability and user adoption. However, ongoing research and development are addressing these issues, paving the way for a more decentralized future.

## Conclusion

Decentralized systems have the potential to revolutionize various industries and empower individuals. As technology continues to evolve, we can expect to see more innovative applications of decentralization in our daily lives.
"#;

/// The built-in posts shown when no posts directory is given.
pub fn sample_posts() -> Vec<Post> {
    vec![
        Post {
            id: "1".to_string(),
            title: "Introduction to Decentralized Blogging".to_string(),
            excerpt: "This is a sample post about decentralized blogging. It covers the basics of how decentralized platforms work and their benefits.".to_string(),
            author: AUTHOR.to_string(),
            date: "2023-04-15".to_string(),
            status: PostStatus::Published,
            content: DECENTRALIZED_BLOGGING.to_string(),
        },
        Post {
            id: "2".to_string(),
            title: "The Future of Web3".to_string(),
            excerpt: "Web3 is the next evolution of the internet. This post explores the potential impact of Web3 technologies on various industries.".to_string(),
            author: AUTHOR.to_string(),
            date: "2023-04-16".to_string(),
            status: PostStatus::Voting,
            content: FUTURE_OF_WEB3.to_string(),
        },
        Post {
            id: "3".to_string(),
            title: "Understanding Zero-Knowledge Proofs".to_string(),
            excerpt: "Zero-knowledge proofs are a cryptographic method that allows one party to prove to another party that a statement is true without revealing any information beyond the validity of the statement itself.".to_string(),
            author: AUTHOR.to_string(),
            date: "2023-04-17".to_string(),
            status: PostStatus::Draft,
            content: ZERO_KNOWLEDGE.to_string(),
        },
        Post {
            id: "4".to_string(),
            title: "Understanding Decentralized Systems".to_string(),
            excerpt: "Decentralized systems are becoming increasingly important in the modern digital landscape.".to_string(),
            author: AUTHOR.to_string(),
            date: "2023-04-18".to_string(),
            status: PostStatus::Published,
            content: DECENTRALIZED_SYSTEMS.to_string(),
        },
    ]
}
