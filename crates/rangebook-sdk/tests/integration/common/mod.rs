pub mod lossy_codec;
