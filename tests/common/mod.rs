pub mod synthetic_bitmap;
