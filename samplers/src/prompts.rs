//! Built-in prompt pools, grouped by the length of answer they tend to draw

pub(crate) const SMALL: &[&str] = &[
    "What is the capital of Canada?",
    "How many days are in a leap year?",
    "What gas do plants absorb from the air?",
    "Name the longest river in Africa.",
    "What is 12 multiplied by 12?",
    "Which element has the atomic number 1?",
    "Who discovered penicillin?",
    "What is the freezing point of water in Fahrenheit?",
    "Translate 'thank you' into French.",
    "How many sides does a hexagon have?",
    "What is the tallest mountain in the world?",
    "Which planet is known as the Red Planet?",
    "What language is spoken in Brazil?",
    "Who wrote Pride and Prejudice?",
    "What is the smallest prime number?",
];

pub(crate) const MEDIUM: &[&str] = &[
    "Explain how public-key cryptography works in plain language.",
    "Describe what happens when you type a URL into a browser and press enter.",
    "Compare processes and threads, and say when you would use each.",
    "Explain the difference between a stack and a queue with everyday examples.",
    "Summarize how vaccines train the immune system.",
    "Describe how a compiler turns source code into an executable.",
    "Explain what an index is in a database and how it speeds up queries.",
    "What are the trade-offs between renting and buying a home?",
    "Describe how photosynthesis converts light into chemical energy.",
    "Explain garbage collection and how it differs from manual memory management.",
];

pub(crate) const LARGE: &[&str] = &[
    "Write a step-by-step tutorial for building a command-line todo application, covering argument parsing, persistence and testing, with code samples.",
    "Explain how the TCP/IP stack works layer by layer, describing what each layer adds and how a packet travels between two hosts.",
    "Write an in-depth comparison of relational, document and key-value databases, including data modelling, consistency and scaling trade-offs.",
    "Describe the full lifecycle of an HTTP request in a modern microservice architecture, from the load balancer to the database and back.",
    "Write a detailed history of the personal computer, from early hobbyist kits to today's laptops, highlighting the key technical shifts.",
    "Explain the principles of operating system scheduling, covering preemption, priorities, fairness and real-time constraints with examples.",
    "Write a thorough guide to designing a CI/CD pipeline, covering build caching, test stages, artifact storage and deployment strategies.",
    "Explain how large language models are trained and served, from tokenization and pretraining to batching and KV caching during inference.",
];
