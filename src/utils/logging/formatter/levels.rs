/// Where a message sits in the console hierarchy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageLevel {
    /// Batch-wide messages
    Root,
    /// Start and end of one conversion
    Stage,
    Step,
    Detail,
}

/// Classifies a message by the phrases the pipeline logs with.
pub fn classify(message: &str) -> MessageLevel {
    if (message.starts_with("Found") && message.contains("to convert"))
        || message.starts_with("Batch finished")
    {
        return MessageLevel::Root;
    }

    if message.starts_with("Converting ")
        || message.starts_with("Converted ")
        || message.starts_with("Conversion cancelled")
        || message.starts_with("Conversion failed")
    {
        return MessageLevel::Stage;
    }

    if message.starts_with("  ") || message.starts_with("ffmpeg: ") || message.starts_with("Running: ") {
        return MessageLevel::Detail;
    }

    MessageLevel::Step
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify() {
        assert_eq!(classify("Found 3 file(s) to convert"), MessageLevel::Root);
        assert_eq!(classify("Converting clip.mov -> clip_HDR.mp4"), MessageLevel::Stage);
        assert_eq!(classify("Converted clip_HDR.mp4 in 12.0s"), MessageLevel::Stage);
        assert_eq!(classify("Encoder ready: ffmpeg (6.1)"), MessageLevel::Step);
        assert_eq!(classify("ffmpeg: x265 [warning]: slow"), MessageLevel::Detail);
    }
}
