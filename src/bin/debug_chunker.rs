use corefsub_rs::chunker::{ChunkLabeler, PatternChunker};

fn main() {
    let tagged = "The/DT new/JJ regulations/NNS will/MD not/RB take/VB effect/NN until/IN March/NNP ./.";
    println!("Input: {}", tagged);

    let (words, tags): (Vec<String>, Vec<String>) = tagged
        .split_whitespace()
        .filter_map(|pair| pair.rsplit_once('/'))
        .map(|(w, t)| (w.to_string(), t.to_string()))
        .unzip();

    let chunker = match PatternChunker::english() {
        Ok(chunker) => chunker,
        Err(e) => {
            eprintln!("Failed to build chunker: {}", e);
            std::process::exit(1);
        }
    };

    println!("\nChunks:");
    for (i, chunk) in chunker.chunks(&tags[..]).iter().enumerate() {
        println!(
            "  {}: {} {:?} - tags: {:?}",
            i,
            chunk.label,
            &words[chunk.start..chunk.end],
            &tags[chunk.start..chunk.end]
        );
    }

    match chunker.label(&words, &tags) {
        Ok(labels) => println!("\nLabels: {}", labels.join(" ")),
        Err(e) => eprintln!("Labeling failed: {}", e),
    }
}
