//! Типы, общие для сервера и клиентов: регламентные задания, пользовательские
//! настройки и состояние панели инструментов дизайнера.

pub mod system;
