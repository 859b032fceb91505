mod interaction;
mod scene;
mod view;
